use tracing::{debug, instrument, trace};

use super::locate_time_row::{is_period_label, locate_time_row};
use crate::{class_pattern::ClassPattern, error::ExtractError, sheet::Sheet};

/// Matched class labels for one day-sheet, one row per classroom.
///
/// `periods` holds the column labels in sheet order; a label can repeat when
/// the header cell was merged across two columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DayPeriodGrid {
  pub periods: Vec<String>,
  pub rows:    Vec<ClassroomRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassroomRow {
  pub classroom: String,
  /// Aligned with [`DayPeriodGrid::periods`].
  pub cells:     Vec<Option<String>>,
}

impl DayPeriodGrid {
  /// Period labels in order of first appearance, without repeats.
  pub fn distinct_periods(&self) -> Vec<&str> {
    let mut seen = Vec::new();
    for period in &self.periods {
      if !seen.contains(&period.as_str()) {
        seen.push(period.as_str());
      }
    }
    seen
  }

  /// `(classroom, label)` pairs under `period`, by row then column.
  pub fn entries_for<'a>(
    &'a self,
    period: &'a str,
  ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    self.rows.iter().flat_map(move |row| {
      self
        .periods
        .iter()
        .zip(&row.cells)
        .filter(move |(p, _)| *p == period)
        .filter_map(|(_, cell)| cell.as_deref())
        .map(move |label| (row.classroom.as_str(), label))
    })
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// Builds the classroom × period grid of one day-sheet, keeping only cells
/// whose text matches `pattern`.
///
/// Merged cells should already be expanded.
#[instrument(skip_all, fields(sheet = sheet.name(), %pattern))]
pub fn build_daily_table(
  sheet: &Sheet,
  pattern: &ClassPattern,
) -> Result<DayPeriodGrid, ExtractError> {
  let sheet = sheet.without_blank_columns();
  let time_row = locate_time_row(&sheet)?;

  // column 0 holds classroom names
  let period_columns = (1..sheet.width())
    .filter_map(|col| {
      let label = sheet.cell(time_row, col).text()?;
      let label = label.trim();
      if is_period_label(label) {
        Some((col, label.to_owned()))
      } else {
        trace!(col, label, "ignoring non-period header column");
        None
      }
    })
    .collect::<Vec<_>>();

  let mut rows = Vec::new();
  for row in (time_row + 1)..sheet.height() {
    let classroom = sheet
      .cell(row, 0)
      .text()
      .map(|t| t.trim().to_owned())
      .unwrap_or_default();

    let cells = period_columns
      .iter()
      .map(|(col, _)| {
        sheet
          .cell(row, *col)
          .text()
          .filter(|text| pattern.is_match(text))
          .map(|text| text.into_owned())
      })
      .collect::<Vec<_>>();

    if cells.iter().all(Option::is_none) {
      continue;
    }
    trace!(%classroom, ?cells, "found matching classes in row");
    rows.push(ClassroomRow { classroom, cells });
  }

  debug!(
    periods = period_columns.len(),
    classrooms = rows.len(),
    "built daily table"
  );

  Ok(DayPeriodGrid {
    periods: period_columns.into_iter().map(|(_, label)| label).collect(),
    rows,
  })
}
