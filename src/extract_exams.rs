use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument, trace, warn};

use crate::sheet::{Cell, Sheet};

/// Rows of title block above and signature block below the exam table.
const FRAME_ROWS: usize = 3;

const NUMBER_HEADER: &str = "NO";
const PERIOD_HEADER: &str = "PERIOD";
const DATE_HEADER: &str = "DATE";
const CLASS_HEADER: &str = "CLASS";

const DATE_TEXT_FORMATS: &[&str] =
  &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y", "%Y/%m/%d"];

/// The fixed exam sittings of a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamPeriod {
  Morning,
  Afternoon,
  Evening,
}

impl ExamPeriod {
  pub fn from_code(code: &str) -> Option<Self> {
    match code.trim() {
      "M" => Some(ExamPeriod::Morning),
      "A" => Some(ExamPeriod::Afternoon),
      "E" => Some(ExamPeriod::Evening),
      _ => None,
    }
  }

  pub fn start_label(&self) -> &'static str {
    match self {
      ExamPeriod::Morning => "7:00 AM",
      ExamPeriod::Afternoon => "11:00 AM",
      ExamPeriod::Evening => "3:00 PM",
    }
  }

  pub fn end_label(&self) -> &'static str {
    match self {
      ExamPeriod::Morning => "10:00 AM",
      ExamPeriod::Afternoon => "2:00 PM",
      ExamPeriod::Evening => "6:00 PM",
    }
  }
}

/// One exam sitting for the requested class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamEntry {
  /// Formatted like `Monday, 1st January 2024`.
  pub date:    String,
  pub class:   String,
  pub start:   String,
  pub end:     String,
  /// Remaining columns by header, in sheet order.
  pub columns: Vec<(String, String)>,
}

impl ExamEntry {
  /// Looks a value up by its column header.
  pub fn get(&self, header: &str) -> Option<&str> {
    match header {
      DATE_HEADER => Some(self.date.as_str()),
      CLASS_HEADER => Some(self.class.as_str()),
      "START" => Some(self.start.as_str()),
      "END" => Some(self.end.as_str()),
      _ => self
        .columns
        .iter()
        .find(|(h, _)| h == header)
        .map(|(_, v)| v.as_str()),
    }
  }
}

/// Pulls the sittings of classes starting with `class_prefix` out of an exam
/// sheet.
///
/// The first and last three rows frame the table; the first row inside the
/// frame holds the headers. Rows with an unknown period code, another class
/// or an unreadable date are dropped.
#[instrument(skip(sheet), fields(sheet = sheet.name()))]
pub fn extract_exam_entries(sheet: &Sheet, class_prefix: &str) -> Vec<ExamEntry> {
  let rows = sheet.rows();
  if rows.len() <= 2 * FRAME_ROWS + 1 {
    warn!(rows = rows.len(), "exam sheet has no rows inside its frame");
    return Vec::new();
  }
  let framed = &rows[FRAME_ROWS..rows.len() - FRAME_ROWS];
  let Some((header_row, data_rows)) = framed.split_first() else {
    return Vec::new();
  };

  let headers = header_row
    .iter()
    .map(|cell| cell.text().map(|t| t.trim().to_owned()).unwrap_or_default())
    .collect::<Vec<_>>();
  let column = |name: &str| headers.iter().position(|h| h == name);
  let (Some(period_col), Some(date_col), Some(class_col)) = (
    column(PERIOD_HEADER),
    column(DATE_HEADER),
    column(CLASS_HEADER),
  ) else {
    warn!(?headers, "exam sheet is missing a PERIOD, DATE or CLASS header");
    return Vec::new();
  };

  let mut entries = Vec::new();
  for (index, row) in data_rows.iter().enumerate() {
    let cell = |col: usize| row.get(col).cloned().unwrap_or(Cell::Empty);
    let text = |col: usize| {
      cell(col).text().map(|t| t.trim().to_owned()).unwrap_or_default()
    };

    let Some(period) = ExamPeriod::from_code(&text(period_col)) else {
      trace!(index, code = %text(period_col), "skipping row without a period");
      continue;
    };

    let class = text(class_col);
    if !class.starts_with(class_prefix) {
      continue;
    }

    let date = match parse_exam_date(&cell(date_col)) {
      Some(date) => date,
      None => {
        warn!(
          index,
          %class,
          date = ?cell(date_col),
          "dropping exam row with unreadable date"
        );
        continue;
      }
    };

    let columns = headers
      .iter()
      .enumerate()
      .filter(|(col, h)| {
        !h.is_empty()
          && ![period_col, date_col, class_col].contains(col)
          && h.as_str() != NUMBER_HEADER
      })
      .map(|(col, h)| (h.clone(), text(col)))
      .collect();

    let entry = ExamEntry {
      date: format_exam_date(date),
      class,
      start: period.start_label().to_owned(),
      end: period.end_label().to_owned(),
      columns,
    };
    trace!(?entry, "kept exam entry");
    entries.push(entry);
  }

  debug!(count = entries.len(), "extracted exam entries");
  entries
}

fn parse_exam_date(cell: &Cell) -> Option<NaiveDate> {
  match cell {
    Cell::DateTime(dt) => Some(dt.date()),
    Cell::Text(text) => DATE_TEXT_FORMATS.iter().find_map(|format| {
      NaiveDate::parse_from_str(text.trim(), format).ok()
    }),
    _ => None,
  }
}

/// `Monday, 1st January 2024`
pub fn format_exam_date(date: NaiveDate) -> String {
  let day = date.day();
  let suffix = match (day % 10, day) {
    (_, 11..=13) => "th",
    (1, _) => "st",
    (2, _) => "nd",
    (3, _) => "rd",
    _ => "th",
  };
  format!("{}, {day}{suffix} {}", date.format("%A"), date.format("%B %Y"))
}
