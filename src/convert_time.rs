use chrono::{NaiveTime, Timelike};
use tracing::trace;

use crate::error::ExtractError;

/// Which end of a period a clock reading belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodBoundary {
  Start,
  End,
}

/// Start and end of one lecture period in 24-hour time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodTimes {
  pub start: NaiveTime,
  pub end:   NaiveTime,
}

/// Maps a bare lecture-sheet hour onto the 24-hour clock.
///
/// Teaching runs from 7 AM to 7 PM. Start hours are read on their own: 7–11
/// are morning, 12 is noon, the rest are afternoon. End hours following a
/// period that ended in the afternoon stay in the afternoon: 12 is noon, up
/// to 7 is shifted, later hours are kept. Hours from 13 are already 24-hour.
pub fn lecture_hour_to_24h(
  hour: u32,
  boundary: PeriodBoundary,
  previous_ended_pm: bool,
) -> u32 {
  let continuing_pm = boundary == PeriodBoundary::End && previous_ended_pm;
  match (continuing_pm, hour) {
    (_, 12) => 12,
    (_, h) if h >= 13 => h,
    (false, h @ 7..=11) => h,
    (false, h) => h + 12,
    (true, h) if h <= 7 => h + 12,
    (true, h) => h,
  }
}

/// Converts an `H:MM` reading from a lecture period label.
pub fn convert_lecture_time(
  text: &str,
  boundary: PeriodBoundary,
  previous_ended_pm: bool,
) -> Result<NaiveTime, ExtractError> {
  let (hour, minute) = parse_clock(text)?;
  let hour = lecture_hour_to_24h(hour, boundary, previous_ended_pm);
  NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
    ExtractError::time_parse(text, format!("{hour}:{minute:02} is not a time"))
  })
}

/// Converts one `H:MM-H:MM` label, given whether the previous period of
/// the day ended in the afternoon.
pub fn convert_period_label(
  label: &str,
  previous_ended_pm: bool,
) -> Result<PeriodTimes, ExtractError> {
  let parts = label.split('-').map(str::trim).collect::<Vec<_>>();
  let (Some(start), Some(end)) = (parts.first(), parts.last()) else {
    return Err(ExtractError::time_parse(label, "missing period bounds"));
  };
  if parts.len() < 2 || start.is_empty() || end.is_empty() {
    return Err(ExtractError::time_parse(label, "missing period bounds"));
  }

  let start =
    convert_lecture_time(start, PeriodBoundary::Start, previous_ended_pm)?;
  let end = convert_lecture_time(end, PeriodBoundary::End, previous_ended_pm)?;
  if start >= end {
    return Err(ExtractError::time_parse(
      label,
      format!("period would end at {end} before starting at {start}"),
    ));
  }

  trace!(label, %start, %end, "converted period label");
  Ok(PeriodTimes { start, end })
}

/// Converts a day's period labels in order, carrying whether the previous
/// successfully converted period ended in the afternoon.
pub fn convert_period_labels<'a>(
  labels: impl IntoIterator<Item = &'a str>,
) -> Vec<Result<PeriodTimes, ExtractError>> {
  labels
    .into_iter()
    .scan(false, |previous_ended_pm, label| {
      let converted = convert_period_label(label, *previous_ended_pm);
      if let Ok(times) = &converted {
        *previous_ended_pm = times.end.hour() >= 12;
      }
      Some(converted)
    })
    .collect()
}

/// Parses a clock reading carrying an explicit `AM`/`PM` marker, such as
/// `"2:00 PM"`. Readings without a marker are taken as morning.
pub fn convert_meridiem_time(text: &str) -> Result<NaiveTime, ExtractError> {
  let upper = text.trim().to_ascii_uppercase();
  if upper.is_empty() {
    return Err(ExtractError::time_parse(text, "time is empty"));
  }
  let is_pm = upper.contains("PM");
  let clock = upper.replace("AM", "").replace("PM", "");

  let (hour, minute) = parse_clock(clock.trim())?;
  let hour = match (is_pm, hour) {
    (true, 12) => 12,
    (true, h) if h < 12 => h + 12,
    (true, h) => {
      return Err(ExtractError::time_parse(
        text,
        format!("{h} is not a 12-hour clock hour"),
      ));
    }
    (false, 12) => 0,
    (false, h) => h,
  };
  NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
    ExtractError::time_parse(text, format!("{hour}:{minute:02} is not a time"))
  })
}

fn parse_clock(text: &str) -> Result<(u32, u32), ExtractError> {
  let (hour, minute) = text
    .trim()
    .split_once(':')
    .ok_or_else(|| ExtractError::time_parse(text, "expected HH:MM"))?;
  let hour = hour
    .trim()
    .parse::<u32>()
    .map_err(|e| ExtractError::time_parse(text, e.to_string()))?;
  let minute = minute
    .trim()
    .parse::<u32>()
    .map_err(|e| ExtractError::time_parse(text, e.to_string()))?;
  Ok((hour, minute))
}
