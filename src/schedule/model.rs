use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
  #[serde(with = "hh_mm")]
  pub start:       NaiveTime,
  #[serde(with = "hh_mm")]
  pub end:         NaiveTime,
  /// The class label; empty for a period with nothing scheduled.
  pub value:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub invigilator: Option<String>,
}

impl TimeSlot {
  pub fn new(start: NaiveTime, end: NaiveTime, value: impl Into<String>) -> Self {
    Self {
      start,
      end,
      value: value.into(),
      class: None,
      location: None,
      invigilator: None,
    }
  }
}

/// One day of a schedule. Lecture days are weekday names; exam days are
/// formatted dates such as `Monday, 1st January 2024`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
  pub day:  String,
  pub data: Vec<TimeSlot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
  pub data:    Vec<ScheduleDay>,
  /// Content hash of the source spreadsheet.
  pub version: String,
}

mod hh_mm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error};

  const FORMAT: &str = "%H:%M";

  pub fn serialize<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&text, FORMAT).map_err(D::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lecture_slots_serialize_without_exam_fields() {
    let slot = TimeSlot::new(
      NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      "EL 3A (LH1)",
    );
    let json = serde_json::to_value(&slot).unwrap();
    assert_eq!(
      json,
      serde_json::json!({"start": "07:00", "end": "09:00", "value": "EL 3A (LH1)"})
    );
  }

  #[test]
  fn exam_slots_keep_their_details() {
    let json = r#"{"start":"11:00","end":"14:00","value":"Surveying",
      "class":"CE 4A","location":"LH2","invigilator":"Dr. Mensah"}"#;
    let slot: TimeSlot = serde_json::from_str(json).unwrap();
    assert_eq!(slot.class.as_deref(), Some("CE 4A"));
    assert_eq!(slot.end, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    assert!(serde_json::from_str::<TimeSlot>(r#"{"start":"7","end":"8","value":""}"#).is_err());
  }
}
