use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::{error::ExtractError, sheet::Sheet};

static PERIOD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\d{1,2}:\d{1,2}-\d{1,2}:\d{1,2}$")
    .expect("period label regex is valid")
});

/// Whether `text` looks like a lecture period label such as `7:00-8:00`.
pub fn is_period_label(text: &str) -> bool { PERIOD_LABEL.is_match(text.trim()) }

/// Index of the first row holding at least one period label.
pub fn locate_time_row(sheet: &Sheet) -> Result<usize, ExtractError> {
  sheet
    .rows()
    .iter()
    .position(|row| {
      row
        .iter()
        .filter_map(|cell| cell.text())
        .any(|text| is_period_label(&text))
    })
    .inspect(|row| trace!(sheet = sheet.name(), row, "found time row"))
    .ok_or_else(|| ExtractError::HeaderNotFound {
      sheet: sheet.name().to_owned(),
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn period_labels() {
    assert!(is_period_label("7:00-8:00"));
    assert!(is_period_label(" 12:30-1:30 "));
    assert!(is_period_label("1:0-2:0"));
    assert!(!is_period_label("7:00 - 8:00"));
    assert!(!is_period_label("7:00-8:00 pm"));
    assert!(!is_period_label("Monday"));
  }

  #[test]
  fn first_matching_row_wins() {
    let sheet = Sheet::from_text_rows("Monday", &[
      &["FACULTY OF ENGINEERING"],
      &["", "MONDAY"],
      &["Room", "7:00-8:00", "8:00-9:00"],
      &["LH1", "EL 3A", ""],
      &["Room", "1:00-2:00"],
    ]);
    assert_eq!(locate_time_row(&sheet).unwrap(), 2);
  }

  #[test]
  fn missing_time_row_is_reported() {
    let sheet = Sheet::from_text_rows("Notes", &[&["nothing", "here"]]);
    assert!(matches!(
      locate_time_row(&sheet),
      Err(ExtractError::HeaderNotFound { sheet }) if sheet == "Notes"
    ));
  }
}
