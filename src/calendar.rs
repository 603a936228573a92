use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::{
  error::ExtractError,
  extract_exams::format_exam_date,
  extract_lectures::weekly_table::weekday_name,
  schedule::model::ScheduleDay,
};

const PRODUCT_ID: &str = "-//Class Schedule Generator//EN";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
/// Content octets per physical line before folding.
const FOLD_OCTETS: usize = 74;

/// One occurrence of a class (or exam) on a concrete date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
  pub summary: String,
  pub start:   NaiveDateTime,
  pub end:     NaiveDateTime,
  pub stamp:   NaiveDateTime,
}

/// Lays the schedule over every date in `start..=end`.
///
/// A schedule day applies to a date when it is named after the date's
/// weekday or carries the date's exam formatting. Empty slots are skipped and
/// multi-line labels are flattened onto one line.
pub fn calendar_events(
  days: &[ScheduleDay],
  start: NaiveDate,
  end: NaiveDate,
  generated_at: NaiveDateTime,
) -> Vec<CalendarEvent> {
  if start > end {
    warn!(%start, %end, "calendar range is backwards");
    return Vec::new();
  }

  let mut events = Vec::new();
  let mut date = start;
  loop {
    let weekday = weekday_name(date.weekday());
    let exam_day = format_exam_date(date);

    for day in days.iter().filter(|d| d.day == weekday || d.day == exam_day) {
      for slot in day.data.iter().filter(|s| !s.value.trim().is_empty()) {
        events.push(CalendarEvent {
          summary: slot.value.replace('\n', " "),
          start:   date.and_time(slot.start),
          end:     date.and_time(slot.end),
          stamp:   generated_at,
        });
      }
    }

    match date.succ_opt() {
      Some(next) if next <= end => date = next,
      _ => break,
    }
  }

  debug!(count = events.len(), "laid schedule over date range");
  events
}

/// Renders events as an iCalendar document with CRLF line endings.
pub fn serialize_calendar(events: &[CalendarEvent]) -> Vec<u8> {
  let mut out = String::new();
  push_line(&mut out, "BEGIN:VCALENDAR");
  push_line(&mut out, "VERSION:2.0");
  push_line(&mut out, &format!("PRODID:{PRODUCT_ID}"));

  for event in events {
    push_line(&mut out, "BEGIN:VEVENT");
    push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.summary)));
    push_line(
      &mut out,
      &format!("DTSTART:{}", event.start.format(DATE_TIME_FORMAT)),
    );
    push_line(
      &mut out,
      &format!("DTEND:{}", event.end.format(DATE_TIME_FORMAT)),
    );
    push_line(
      &mut out,
      &format!("DTSTAMP:{}", event.stamp.format(DATE_TIME_FORMAT)),
    );
    push_line(&mut out, "END:VEVENT");
  }

  push_line(&mut out, "END:VCALENDAR");
  out.into_bytes()
}

/// Builds the calendar for `start..=end`, stamped with the local time.
#[instrument(skip(days))]
pub fn generate_calendar(
  days: &[ScheduleDay],
  start: NaiveDate,
  end: NaiveDate,
  require_events: bool,
) -> Result<Vec<u8>, ExtractError> {
  let events = calendar_events(days, start, end, Local::now().naive_local());
  if require_events && events.is_empty() {
    return Err(ExtractError::NoEvents { start, end });
  }

  info!(events = events.len(), "generated calendar");
  Ok(serialize_calendar(&events))
}

fn escape_text(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' => escaped.push_str("\\\\"),
      ';' => escaped.push_str("\\;"),
      ',' => escaped.push_str("\\,"),
      '\n' => escaped.push_str("\\n"),
      '\r' => {}
      c => escaped.push(c),
    }
  }
  escaped
}

/// Appends a content line, folding it so every physical line carries at most
/// [`FOLD_OCTETS`] content octets after any leading fold space. Folds never
/// split a character.
fn push_line(out: &mut String, line: &str) {
  let mut used = 0;
  for c in line.chars() {
    if used + c.len_utf8() > FOLD_OCTETS {
      out.push_str("\r\n ");
      used = 0;
    }
    out.push(c);
    used += c.len_utf8();
  }
  out.push_str("\r\n");
}
