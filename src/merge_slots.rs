use tracing::trace;

use crate::schedule::model::TimeSlot;

/// Collapses a day's period-ordered slots in one pass.
///
/// A slot extends the open one when it carries the same label and starts
/// where the open one ends; otherwise the open slot is emitted. Slots with an
/// empty label are dropped without closing the open slot.
pub fn merge_slots(slots: impl IntoIterator<Item = TimeSlot>) -> Vec<TimeSlot> {
  let mut merged = Vec::new();
  let mut open: Option<TimeSlot> = None;

  for slot in slots {
    if slot.value.trim().is_empty() {
      continue;
    }
    match open.as_mut() {
      Some(current) if current.value == slot.value && current.end == slot.start => {
        trace!(value = %slot.value, end = %slot.end, "extending slot");
        current.end = slot.end;
      }
      _ => {
        if let Some(done) = open.replace(slot) {
          merged.push(done);
        }
      }
    }
  }
  merged.extend(open);

  merged
}

#[cfg(test)]
mod tests {
  use chrono::NaiveTime;

  use super::*;

  fn slot(start: u32, end: u32, value: &str) -> TimeSlot {
    TimeSlot::new(
      NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
      value,
    )
  }

  #[test]
  fn contiguous_identical_labels_merge() {
    let merged = merge_slots(vec![
      slot(7, 8, "EL 3A (LH1)"),
      slot(8, 9, "EL 3A (LH1)"),
      slot(9, 10, "EL 3B (LH2)"),
      slot(10, 11, "EL 3A (LH1)"),
    ]);

    assert_eq!(merged, vec![
      slot(7, 9, "EL 3A (LH1)"),
      slot(9, 10, "EL 3B (LH2)"),
      slot(10, 11, "EL 3A (LH1)"),
    ]);
  }

  #[test]
  fn empty_labels_leave_gaps() {
    let merged = merge_slots(vec![
      slot(7, 8, ""),
      slot(8, 9, "EL 3A (LH1)"),
      slot(9, 10, ""),
      slot(10, 11, "EL 3A (LH1)"),
      slot(11, 12, "EL 3A (LH1)"),
      slot(12, 13, " "),
    ]);

    assert_eq!(merged, vec![
      slot(8, 9, "EL 3A (LH1)"),
      slot(10, 12, "EL 3A (LH1)"),
    ]);
  }

  #[test]
  fn non_contiguous_slots_stay_apart() {
    let merged =
      merge_slots(vec![slot(7, 8, "EL 3A"), slot(9, 10, "EL 3A")]);
    assert_eq!(merged.len(), 2);
  }

  #[test]
  fn merging_is_idempotent() {
    let once = merge_slots(vec![
      slot(7, 8, "A"),
      slot(8, 9, "A"),
      slot(9, 10, ""),
      slot(10, 11, "B"),
      slot(11, 12, "A"),
      slot(12, 13, "A"),
    ]);
    let twice = merge_slots(once.clone());
    assert_eq!(once, twice);
  }

  #[test]
  fn nothing_in_nothing_out() {
    assert!(merge_slots(Vec::new()).is_empty());
    assert!(merge_slots(vec![slot(7, 8, "")]).is_empty());
  }
}
