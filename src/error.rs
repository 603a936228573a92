use miette::Diagnostic;
use thiserror::Error;

/// Failures produced by the extraction pipeline.
///
/// Row- and sheet-level variants are usually logged and skipped by the
/// caller; the remainder abort the extraction.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
  #[error("invalid class pattern {pattern:?}: {reason}")]
  #[diagnostic(
    code(timetable::invalid_pattern),
    help("class patterns look like \"EL 3\": a 2-3 letter department and a \
          single year digit")
  )]
  InvalidPattern { pattern: String, reason: String },

  #[error("sheet {sheet:?} has no row of `HH:MM-HH:MM` period labels")]
  #[diagnostic(code(timetable::header_not_found))]
  HeaderNotFound { sheet: String },

  #[error("no sheet is named after a weekday (Monday to Friday)")]
  #[diagnostic(
    code(timetable::no_weekday_sheet),
    help("lecture timetables need one sheet per teaching day")
  )]
  NoWeekdaySheet,

  #[error("failed to parse time {input:?}: {reason}")]
  #[diagnostic(code(timetable::time_parse))]
  TimeParse { input: String, reason: String },

  #[error("timetable source not found: {path}")]
  #[diagnostic(code(timetable::source_not_found))]
  SourceNotFound { path: String },

  #[error("no calendar events fall between {start} and {end}")]
  #[diagnostic(code(timetable::no_events))]
  NoEvents {
    start: chrono::NaiveDate,
    end:   chrono::NaiveDate,
  },
}

impl ExtractError {
  pub(crate) fn time_parse(
    input: impl Into<String>,
    reason: impl Into<String>,
  ) -> Self {
    ExtractError::TimeParse {
      input:  input.into(),
      reason: reason.into(),
    }
  }
}
