use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of a rendered timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Caller-assigned identity. Generated items have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 12-hour clock string such as `4:30 PM`.
    pub time: String,
    pub label: String,
}

impl ScheduleItem {
    /// A freshly generated item, without an id.
    pub fn generated(time: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            time: time.into(),
            label: label.into(),
        }
    }
}

/// The user-supplied knobs for generation, as they arrive on the wire and as
/// they are stored alongside a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInputs {
    /// Ceremony start in `4:30 PM`, `4 PM`, or `16:30` form. Anything else
    /// anchors the day at noon.
    #[serde(default)]
    pub ceremony_time: String,
    #[serde(default)]
    pub first_look: bool,
    #[serde(default = "default_group_photo_count")]
    pub group_photo_count: i32,
    #[serde(default, alias = "travel_minutes_between_locations")]
    pub travel_minutes: i32,
}

fn default_group_photo_count() -> i32 {
    10
}

impl Default for ScheduleInputs {
    fn default() -> Self {
        Self {
            ceremony_time: String::new(),
            first_look: false,
            group_photo_count: default_group_photo_count(),
            travel_minutes: 0,
        }
    }
}

impl ScheduleInputs {
    /// Bind these inputs to an event date.
    pub fn on(self, event_date: NaiveDate) -> GenerationParameters {
        GenerationParameters {
            event_date,
            inputs: self,
        }
    }
}

/// Everything the generator needs: the event date plus [`ScheduleInputs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub event_date: NaiveDate,
    #[serde(flatten)]
    pub inputs: ScheduleInputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_apply_defaults() {
        let inputs: ScheduleInputs = serde_json::from_str(r#"{"ceremony_time": "4 PM"}"#).unwrap();
        assert_eq!(inputs.group_photo_count, 10);
        assert_eq!(inputs.travel_minutes, 0);
        assert!(!inputs.first_look);
    }

    #[test]
    fn travel_minutes_accepts_long_name() {
        let inputs: ScheduleInputs = serde_json::from_str(
            r#"{"ceremony_time": "4:30 PM", "first_look": true, "travel_minutes_between_locations": 25}"#,
        )
        .unwrap();
        assert_eq!(inputs.travel_minutes, 25);
        assert!(inputs.first_look);
    }

    #[test]
    fn generated_items_omit_id_on_the_wire() {
        let item = ScheduleItem::generated("4:30 PM", "Ceremony begins");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"time": "4:30 PM", "label": "Ceremony begins"})
        );
    }

    #[test]
    fn parameters_store_flat() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let params = ScheduleInputs {
            ceremony_time: "16:30".into(),
            ..Default::default()
        }
        .on(date);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["event_date"], "2026-06-20");
        assert_eq!(json["ceremony_time"], "16:30");
        assert_eq!(json["group_photo_count"], 10);
    }
}
