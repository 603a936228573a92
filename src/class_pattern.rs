use std::{fmt, str::FromStr};

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::error::ExtractError;

/// Label shapes accepted for a department/year pair. `{dept}` and `{year}`
/// are substituted before compiling; every template is tried in order.
const CLASS_LABEL_TEMPLATES: &[(&str, &str)] = &[
  // "CE 4", "CE 4A"
  ("section", r"{dept}\s*{year}[A-Z]?"),
  // "CE 4A, 4B"
  ("sections", r"{dept}\s*{year}[A-Z](?:\s*,\s*{year}[A-Z])*"),
  // "CE 4A, CE 4B"
  (
    "repeated_department",
    r"{dept}\s*{year}[A-Z](?:\s*,\s*{dept}\s*{year}[A-Z])*",
  ),
  // "CE 459"
  ("course", r"{dept}\s*{year}[0-9]{2}"),
  // "RN/CE 459", "ME, CE/RN 459"
  (
    "shared_course",
    r"(?:[A-Z]{2,3}(?:\s*[,/]\s*)?)*{dept}(?:\s*[,/]\s*[A-Z]{2,3})*\s+{year}[0-9]{2}",
  ),
  // "CE/RN 459"
  (
    "shared_course_department_first",
    r"{dept}(?:\s*[,/]\s*[A-Z]{2,3})+\s+{year}[0-9]{2}",
  ),
];

/// A department and year filter such as `EL 3`, compiled into a matcher for
/// the free-text class labels found in timetable cells.
#[derive(Clone, Debug)]
pub struct ClassPattern {
  department: String,
  year:       char,
  matcher:    Regex,
}

impl ClassPattern {
  pub fn new(pattern: &str) -> Result<Self, ExtractError> {
    let invalid = |reason: &str| ExtractError::InvalidPattern {
      pattern: pattern.to_owned(),
      reason:  reason.to_owned(),
    };

    let tokens = pattern.split_whitespace().collect::<Vec<_>>();
    let [department, year] = tokens.as_slice() else {
      return Err(invalid("expected a department and a year"));
    };

    if !(2..=3).contains(&department.len())
      || !department.chars().all(|c| c.is_ascii_alphabetic())
    {
      return Err(invalid("department must be 2 or 3 letters"));
    }
    let mut year_chars = year.chars();
    let year = match (year_chars.next(), year_chars.next()) {
      (Some(y), None) if y.is_ascii_digit() => y,
      _ => return Err(invalid("year must be a single digit")),
    };

    let department = department.to_ascii_uppercase();
    let alternation = CLASS_LABEL_TEMPLATES
      .iter()
      .map(|(_, template)| {
        let body = template
          .replace("{dept}", &regex::escape(&department))
          .replace("{year}", &year.to_string());
        format!(r"\b(?:{body})")
      })
      .collect::<Vec<_>>()
      .join("|");
    trace!(%alternation, "compiled class pattern");

    let matcher = RegexBuilder::new(&alternation)
      .case_insensitive(true)
      .build()
      .map_err(|e| invalid(&e.to_string()))?;

    Ok(Self {
      department,
      year,
      matcher,
    })
  }

  pub fn department(&self) -> &str { &self.department }

  pub fn year(&self) -> char { self.year }

  /// Whether the cell text contains a label for this class.
  pub fn is_match(&self, text: &str) -> bool { self.matcher.is_match(text) }

  /// The pattern with whitespace removed, as used in cache keys.
  pub fn compact(&self) -> String { format!("{}{}", self.department, self.year) }
}

impl fmt::Display for ClassPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.department, self.year)
  }
}

impl FromStr for ClassPattern {
  type Err = ExtractError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { ClassPattern::new(s) }
}
