use chrono::Weekday;
use tracing::{debug, instrument, trace, warn};

use super::daily_table::DayPeriodGrid;
use crate::error::ExtractError;

/// Teaching days, in table order.
pub const TEACHING_DAYS: [Weekday; 5] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
];

pub fn weekday_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Monday",
    Weekday::Tue => "Tuesday",
    Weekday::Wed => "Wednesday",
    Weekday::Thu => "Thursday",
    Weekday::Fri => "Friday",
    Weekday::Sat => "Saturday",
    Weekday::Sun => "Sunday",
  }
}

/// The teaching day a sheet is named after, ignoring case.
pub fn teaching_day_from_sheet_name(name: &str) -> Option<Weekday> {
  TEACHING_DAYS
    .into_iter()
    .find(|day| weekday_name(*day).eq_ignore_ascii_case(name.trim()))
}

/// Day × period table of joined `"label (classroom)"` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyTable {
  pub periods: Vec<String>,
  /// Monday to Friday, in order.
  pub days:    Vec<WeeklyRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyRow {
  pub day:   Weekday,
  /// Aligned with [`WeeklyTable::periods`].
  pub cells: Vec<Option<String>>,
}

impl WeeklyTable {
  pub fn get(&self, day: Weekday, period: &str) -> Option<&str> {
    let col = self.periods.iter().position(|p| p == period)?;
    self
      .days
      .iter()
      .find(|row| row.day == day)?
      .cells
      .get(col)?
      .as_deref()
  }
}

/// Combines the per-sheet grids into one weekly table.
///
/// The period columns are those of the first sheet named after a teaching
/// day; other sheets' periods outside that set are dropped.
#[instrument(skip_all, fields(sheets = daily_tables.len()))]
pub fn aggregate_weekly_table(
  daily_tables: &[(String, DayPeriodGrid)],
) -> Result<WeeklyTable, ExtractError> {
  let periods = daily_tables
    .iter()
    .find(|(name, _)| teaching_day_from_sheet_name(name).is_some())
    .map(|(_, grid)| {
      grid
        .distinct_periods()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>()
    })
    .ok_or(ExtractError::NoWeekdaySheet)?;
  debug!(?periods, "fixed weekly period columns");

  let mut entries = vec![vec![Vec::<String>::new(); periods.len()]; 5];

  for (name, grid) in daily_tables {
    let Some(day) = teaching_day_from_sheet_name(name) else {
      debug!(sheet = %name, "sheet is not named after a teaching day, ignoring");
      continue;
    };
    let day_entries = &mut entries[day.num_days_from_monday() as usize];

    for period in grid.distinct_periods() {
      let Some(col) = periods.iter().position(|p| p == period) else {
        if grid.entries_for(period).next().is_some() {
          warn!(
            sheet = %name,
            period, "period is missing from the weekly columns, dropping"
          );
        }
        continue;
      };

      for (classroom, label) in grid.entries_for(period) {
        let label = collapse_whitespace(label);
        let tagged = if classroom.is_empty() {
          label
        } else {
          format!("{label} ({classroom})")
        };
        let cell = &mut day_entries[col];
        if !cell.contains(&tagged) {
          trace!(sheet = %name, period, %tagged, "adding weekly entry");
          cell.push(tagged);
        }
      }
    }
  }

  let days = TEACHING_DAYS
    .into_iter()
    .zip(entries)
    .map(|(day, cells)| WeeklyRow {
      day,
      cells: cells
        .into_iter()
        .map(|c| (!c.is_empty()).then(|| c.join("\n")))
        .collect(),
    })
    .collect();

  Ok(WeeklyTable { periods, days })
}

fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::extract_lectures::daily_table::ClassroomRow;

  fn grid(periods: &[&str], rows: &[(&str, &[&str])]) -> DayPeriodGrid {
    DayPeriodGrid {
      periods: periods.iter().map(|p| p.to_string()).collect(),
      rows:    rows
        .iter()
        .map(|(classroom, cells)| ClassroomRow {
          classroom: classroom.to_string(),
          cells:     cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect(),
        })
        .collect(),
    }
  }

  #[test]
  fn entries_are_tagged_and_joined() {
    let tables = vec![
      (
        "Monday".to_owned(),
        grid(&["7:00-8:00", "8:00-9:00"], &[
          ("LH1", &["EL  3A", "EL 3A"]),
          ("LH2", &["EL 3B\n", ""]),
        ]),
      ),
      (
        "tuesday".to_owned(),
        grid(&["7:00-8:00", "8:00-9:00"], &[("LAB", &["", "EL 3C"])]),
      ),
    ];

    let table = aggregate_weekly_table(&tables).unwrap();

    assert_eq!(table.periods, vec!["7:00-8:00", "8:00-9:00"]);
    assert_eq!(
      table.get(Weekday::Mon, "7:00-8:00"),
      Some("EL 3A (LH1)\nEL 3B (LH2)")
    );
    assert_eq!(table.get(Weekday::Mon, "8:00-9:00"), Some("EL 3A (LH1)"));
    assert_eq!(table.get(Weekday::Tue, "8:00-9:00"), Some("EL 3C (LAB)"));
    assert_eq!(table.get(Weekday::Tue, "7:00-8:00"), None);
    assert_eq!(table.get(Weekday::Fri, "7:00-8:00"), None);
  }

  #[test]
  fn only_teaching_days_appear() {
    let tables = vec![
      ("Cover".to_owned(), grid(&["6:00-7:00"], &[("X", &["EL 3A"])])),
      ("Saturday".to_owned(), grid(&["7:00-8:00"], &[("X", &["EL 3A"])])),
      ("Wednesday".to_owned(), grid(&["7:00-8:00"], &[("LH1", &["EL 3A"])])),
    ];

    let table = aggregate_weekly_table(&tables).unwrap();

    assert_eq!(table.periods, vec!["7:00-8:00"]);
    assert_eq!(
      table.days.iter().map(|r| r.day).collect::<Vec<_>>(),
      TEACHING_DAYS.to_vec()
    );
    assert_eq!(table.get(Weekday::Wed, "7:00-8:00"), Some("EL 3A (LH1)"));
    assert_eq!(table.get(Weekday::Mon, "7:00-8:00"), None);
  }

  #[test]
  fn later_sheets_cannot_add_periods() {
    let tables = vec![
      ("Monday".to_owned(), grid(&["7:00-8:00"], &[])),
      (
        "Tuesday".to_owned(),
        grid(&["7:00-8:00", "5:00-6:00"], &[("LH1", &["EL 3A", "EL 3A"])]),
      ),
    ];

    let table = aggregate_weekly_table(&tables).unwrap();

    assert_eq!(table.periods, vec!["7:00-8:00"]);
    assert_eq!(table.get(Weekday::Tue, "7:00-8:00"), Some("EL 3A (LH1)"));
    assert_eq!(table.get(Weekday::Tue, "5:00-6:00"), None);
  }

  #[test]
  fn duplicated_header_columns_do_not_duplicate_entries() {
    let tables = vec![(
      "Monday".to_owned(),
      grid(&["7:00-9:00", "7:00-9:00"], &[("LH1", &["EL 3A", "EL 3A"])]),
    )];

    let table = aggregate_weekly_table(&tables).unwrap();
    assert_eq!(table.get(Weekday::Mon, "7:00-9:00"), Some("EL 3A (LH1)"));
  }

  #[test]
  fn no_weekday_sheet_is_fatal() {
    let tables = vec![("Cover".to_owned(), grid(&["7:00-8:00"], &[]))];
    assert!(matches!(
      aggregate_weekly_table(&tables),
      Err(ExtractError::NoWeekdaySheet)
    ));
    assert!(matches!(
      aggregate_weekly_table(&[]),
      Err(ExtractError::NoWeekdaySheet)
    ));
  }
}
