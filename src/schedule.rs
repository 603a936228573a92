pub mod model;

use tracing::{debug, warn};

use self::model::{ScheduleDay, TimeSlot};
use crate::{
  convert_time::{convert_meridiem_time, convert_period_labels},
  extract_exams::ExamEntry,
  extract_lectures::weekly_table::{WeeklyTable, weekday_name},
  merge_slots::merge_slots,
};

/// Converts the weekly table's periods to 24-hour time and merges each
/// day's contiguous classes. Periods whose times cannot be read are dropped.
pub fn synthesize_lecture_schedule(table: &WeeklyTable) -> Vec<ScheduleDay> {
  let period_times =
    convert_period_labels(table.periods.iter().map(String::as_str));
  for (period, converted) in table.periods.iter().zip(&period_times) {
    if let Err(e) = converted {
      warn!(%period, error = %e, "dropping period with unreadable times");
    }
  }

  table
    .days
    .iter()
    .map(|row| {
      let slots =
        row
          .cells
          .iter()
          .zip(&period_times)
          .filter_map(|(cell, times)| {
            let times = times.as_ref().ok()?;
            Some(TimeSlot::new(
              times.start,
              times.end,
              cell.clone().unwrap_or_default(),
            ))
          });
      let data = merge_slots(slots);
      debug!(day = %row.day, slots = data.len(), "synthesized lecture day");

      ScheduleDay {
        day: weekday_name(row.day).to_owned(),
        data,
      }
    })
    .collect()
}

/// One schedule day per exam sitting, keyed by the formatted exam date.
pub fn synthesize_exam_schedule(entries: &[ExamEntry]) -> Vec<ScheduleDay> {
  entries
    .iter()
    .filter_map(|entry| {
      let times = convert_meridiem_time(&entry.start)
        .and_then(|start| Ok((start, convert_meridiem_time(&entry.end)?)));
      let (start, end) = match times {
        Ok(times) => times,
        Err(e) => {
          warn!(?entry, error = %e, "dropping exam entry with unreadable times");
          return None;
        }
      };

      let field = |header: &str| entry.get(header).unwrap_or_default().to_owned();
      Some(ScheduleDay {
        day:  entry.date.clone(),
        data: vec![TimeSlot {
          start,
          end,
          value: field("COURSE NAME"),
          class: Some(entry.class.clone()),
          location: Some(field("LECTURE HALL")),
          invigilator: Some(field("INVIGILATOR (UPDATED)")),
        }],
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveTime, Weekday};

  use super::*;
  use crate::extract_lectures::weekly_table::{TEACHING_DAYS, WeeklyRow};

  fn hm(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

  fn table(periods: &[&str], monday: &[Option<&str>]) -> WeeklyTable {
    WeeklyTable {
      periods: periods.iter().map(|p| p.to_string()).collect(),
      days:    TEACHING_DAYS
        .into_iter()
        .map(|day| WeeklyRow {
          day,
          cells: if day == Weekday::Mon {
            monday.iter().map(|c| c.map(str::to_owned)).collect()
          } else {
            vec![None; periods.len()]
          },
        })
        .collect(),
    }
  }

  #[test]
  fn lecture_days_are_converted_and_merged() {
    let table = table(&["7:00-8:00", "8:00-9:00", "12:00-1:00", "1:00-2:00"], &[
      Some("EL 3A (LH1)"),
      Some("EL 3A (LH1)"),
      None,
      Some("EL 3B (LH2)"),
    ]);

    let schedule = synthesize_lecture_schedule(&table);

    assert_eq!(
      schedule.iter().map(|d| d.day.as_str()).collect::<Vec<_>>(),
      vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
    );
    assert_eq!(schedule[0].data, vec![
      TimeSlot::new(hm(7, 0), hm(9, 0), "EL 3A (LH1)"),
      TimeSlot::new(hm(13, 0), hm(14, 0), "EL 3B (LH2)"),
    ]);
    assert!(schedule[1].data.is_empty());
  }

  #[test]
  fn unreadable_periods_are_dropped() {
    let table = table(&["7:00-8:00", "9:00-7:30"], &[Some("A"), Some("A")]);
    let schedule = synthesize_lecture_schedule(&table);
    assert_eq!(schedule[0].data, vec![TimeSlot::new(hm(7, 0), hm(8, 0), "A")]);
  }

  #[test]
  fn exam_entries_become_dated_days() {
    let entry = ExamEntry {
      date:    "Monday, 1st January 2024".to_owned(),
      class:   "CE 4A".to_owned(),
      start:   "11:00 AM".to_owned(),
      end:     "2:00 PM".to_owned(),
      columns: vec![
        ("COURSE NAME".to_owned(), "Surveying".to_owned()),
        ("LECTURE HALL".to_owned(), "LH2".to_owned()),
      ],
    };
    let mut broken = entry.clone();
    broken.end = "later".to_owned();

    let schedule = synthesize_exam_schedule(&[entry, broken]);

    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].day, "Monday, 1st January 2024");
    let slot = &schedule[0].data[0];
    assert_eq!((slot.start, slot.end), (hm(11, 0), hm(14, 0)));
    assert_eq!(slot.value, "Surveying");
    assert_eq!(slot.location.as_deref(), Some("LH2"));
    assert_eq!(slot.invigilator.as_deref(), Some(""));
  }
}
