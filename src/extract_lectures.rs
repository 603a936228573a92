pub mod daily_table;
pub mod locate_time_row;
pub mod weekly_table;

use tracing::{info, instrument, warn};

use self::{
  daily_table::build_daily_table,
  weekly_table::{WeeklyTable, aggregate_weekly_table},
};
use crate::{
  class_pattern::ClassPattern, error::ExtractError,
  expand_merged_cells::expand_two_column_merges, sheet::Sheet,
};

/// Runs every day-sheet of a lecture workbook through merged-cell expansion
/// and the daily table builder, then aggregates the weekly table.
///
/// A sheet without a time row is skipped unless it is the only sheet.
#[instrument(skip_all, fields(sheets = sheets.len(), %pattern))]
pub fn extract_weekly_table(
  sheets: Vec<Sheet>,
  pattern: &ClassPattern,
) -> Result<WeeklyTable, ExtractError> {
  let only_sheet = sheets.len() == 1;
  let mut daily_tables = Vec::with_capacity(sheets.len());

  for mut sheet in sheets {
    expand_two_column_merges(&mut sheet);
    match build_daily_table(&sheet, pattern) {
      Ok(grid) => daily_tables.push((sheet.name().to_owned(), grid)),
      Err(e @ ExtractError::HeaderNotFound { .. }) if !only_sheet => {
        warn!(error = %e, "skipping sheet without a time row");
      }
      Err(e) => return Err(e),
    }
  }

  let table = aggregate_weekly_table(&daily_tables)?;
  info!(periods = table.periods.len(), "extracted weekly table");
  Ok(table)
}

#[cfg(test)]
mod tests {
  use chrono::Weekday;

  use super::*;
  use crate::sheet::MergedRegion;

  fn el3() -> ClassPattern { ClassPattern::new("EL 3").unwrap() }

  #[test]
  fn merged_headers_feed_the_weekly_table() {
    let monday = Sheet::from_text_rows("Monday", &[
      &["Room", "7:00-8:00", "8:00-9:00"],
      &["LH1", "EL 3A", ""],
    ])
    .with_merged_region(MergedRegion {
      min_row: 1,
      min_col: 1,
      max_row: 1,
      max_col: 2,
    });

    let table = extract_weekly_table(vec![monday], &el3()).unwrap();

    assert_eq!(table.get(Weekday::Mon, "7:00-8:00"), Some("EL 3A (LH1)"));
    assert_eq!(table.get(Weekday::Mon, "8:00-9:00"), Some("EL 3A (LH1)"));
  }

  #[test]
  fn headerless_sheets_are_skipped_among_others() {
    let cover = Sheet::from_text_rows("Cover", &[&["Semester 1"]]);
    let monday = Sheet::from_text_rows("Monday", &[
      &["Room", "7:00-8:00"],
      &["LH1", "EL 3A"],
    ]);

    let table = extract_weekly_table(vec![cover, monday], &el3()).unwrap();
    assert_eq!(table.get(Weekday::Mon, "7:00-8:00"), Some("EL 3A (LH1)"));
  }

  #[test]
  fn lone_headerless_sheet_is_fatal() {
    let monday = Sheet::from_text_rows("Monday", &[&["Room", "EL 3A"]]);
    assert!(matches!(
      extract_weekly_table(vec![monday], &el3()),
      Err(ExtractError::HeaderNotFound { .. })
    ));
  }

  #[test]
  fn headerless_weekday_sheets_leave_no_weekday() {
    let cover = Sheet::from_text_rows("Cover", &[&["Semester 1"]]);
    let monday = Sheet::from_text_rows("Monday", &[&["Room", "EL 3A"]]);
    assert!(matches!(
      extract_weekly_table(vec![cover, monday], &el3()),
      Err(ExtractError::NoWeekdaySheet)
    ));
  }
}
