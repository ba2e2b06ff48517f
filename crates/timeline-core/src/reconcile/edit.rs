//! Validation of user edit payloads.
//!
//! The payload arrives as loose JSON. It is turned into a typed
//! [`TimelineEdit`] here so nothing untyped travels further in.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{Result, TimelineError};
use crate::schedule::{ScheduleItem, parse_clock_time};

/// What an edit does to the project's event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePatch {
    /// Field absent: leave the date alone.
    Keep,
    /// `null` or `""`: remove the date.
    Clear,
    Set(NaiveDate),
}

/// A validated edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEdit {
    /// Complete replacement item list, sorted by clock time.
    pub items: Vec<ScheduleItem>,
    pub title: Option<String>,
    pub event_date: DatePatch,
}

impl TimelineEdit {
    /// Validate a raw edit payload.
    ///
    /// `items` must be an array. Entries without a non-empty string `id`
    /// and `label` are dropped rather than rejected; a missing or
    /// non-string `time` becomes an empty string. Kept items are stably
    /// sorted by clock time, with unparseable times last in caller order.
    pub fn from_json(payload: &Value) -> Result<Self> {
        let obj = payload.as_object().ok_or_else(|| {
            TimelineError::InvalidArgument("edit payload must be a JSON object".into())
        })?;

        let raw_items = obj.get("items").and_then(Value::as_array).ok_or_else(|| {
            TimelineError::InvalidArgument("`items` must be a list".into())
        })?;

        let mut items: Vec<ScheduleItem> = raw_items.iter().filter_map(item_from_json).collect();
        let dropped = raw_items.len() - items.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = items.len(), "dropped malformed timeline items");
        }

        items.sort_by_key(|item| {
            let at = parse_clock_time(&item.time);
            (at.is_none(), at)
        });

        Ok(Self {
            items,
            title: title_from_json(obj)?,
            event_date: date_patch_from_json(obj)?,
        })
    }
}

fn item_from_json(value: &Value) -> Option<ScheduleItem> {
    let obj = value.as_object()?;
    let id = non_empty_str(obj, "id")?;
    let label = non_empty_str(obj, "label")?;
    let time = obj.get("time").and_then(Value::as_str).unwrap_or_default();

    Some(ScheduleItem {
        id: Some(id.to_owned()),
        time: time.to_owned(),
        label: label.to_owned(),
    })
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn title_from_json(obj: &Map<String, Value>) -> Result<Option<String>> {
    match obj.get("title") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(title)) => Ok(Some(title.clone())),
        Some(other) => Err(TimelineError::InvalidArgument(format!(
            "`title` must be a string, got {other}"
        ))),
    }
}

fn date_patch_from_json(obj: &Map<String, Value>) -> Result<DatePatch> {
    match obj.get("event_date") {
        None => Ok(DatePatch::Keep),
        Some(Value::Null) => Ok(DatePatch::Clear),
        Some(Value::String(s)) => Ok(match parse_event_date(s)? {
            Some(date) => DatePatch::Set(date),
            None => DatePatch::Clear,
        }),
        Some(other) => Err(TimelineError::InvalidArgument(format!(
            "`event_date` must be a string, got {other}"
        ))),
    }
}

/// Parse an ISO-8601 calendar date. Blank input means "no date".
pub fn parse_event_date(input: &str) -> Result<Option<NaiveDate>> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| TimelineError::InvalidArgument(format!("invalid event date {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sorts_items_by_clock_time() {
        let edit = TimelineEdit::from_json(&json!({
            "items": [
                {"id": "b", "time": "5:00 PM", "label": "Toasts"},
                {"id": "a", "time": "4:30 PM", "label": "Ceremony begins"},
            ]
        }))
        .unwrap();

        let ids: Vec<_> = edit.items.iter().map(|i| i.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(edit.title, None);
        assert_eq!(edit.event_date, DatePatch::Keep);
    }

    #[test]
    fn mixed_formats_sort_and_unparseable_times_trail() {
        let edit = TimelineEdit::from_json(&json!({
            "items": [
                {"id": "late", "time": "after dinner", "label": "Sparkler exit"},
                {"id": "toast", "time": "19:15", "label": "Toasts"},
                {"id": "blank", "label": "Sunset portraits"},
                {"id": "dance", "time": "7 PM", "label": "First dance"},
                {"id": "same", "time": "7:00 PM", "label": "Grand entrance"},
                {"id": "prep", "time": "11:00 am", "label": "Hair and makeup"},
            ]
        }))
        .unwrap();

        let ids: Vec<_> = edit.items.iter().map(|i| i.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["prep", "dance", "same", "toast", "late", "blank"]);
    }

    #[test]
    fn drops_items_missing_id_or_label() {
        let edit = TimelineEdit::from_json(&json!({
            "items": [
                {"id": "1", "time": "1:00 PM", "label": "Kept"},
                {"id": "2", "time": "2:00 PM"},
                {"id": "3", "time": "3:00 PM", "label": ""},
                {"time": "4:00 PM", "label": "No id"},
                {"id": "", "label": "Empty id"},
                "not an object",
                42,
            ]
        }))
        .unwrap();

        assert_eq!(edit.items.len(), 1);
        assert_eq!(edit.items[0].label, "Kept");
    }

    #[test]
    fn whitespace_id_and_label_count_as_present() {
        let edit = TimelineEdit::from_json(&json!({
            "items": [{"id": " ", "time": "1:00 PM", "label": "  "}]
        }))
        .unwrap();
        assert_eq!(edit.items.len(), 1);
        assert_eq!(edit.items[0].id.as_deref(), Some(" "));
        assert_eq!(edit.items[0].label, "  ");
    }

    #[test]
    fn missing_time_becomes_empty() {
        let edit = TimelineEdit::from_json(&json!({
            "items": [{"id": "new", "label": "New item"}]
        }))
        .unwrap();
        assert_eq!(edit.items[0].time, "");
    }

    #[test]
    fn items_must_be_a_list() {
        for payload in [
            json!({"items": {"id": "1", "label": "x"}}),
            json!({"items": "nope"}),
            json!({}),
            json!([{"id": "1", "label": "x"}]),
        ] {
            let err = TimelineEdit::from_json(&payload).unwrap_err();
            assert!(
                matches!(err, TimelineError::InvalidArgument(_)),
                "expected InvalidArgument for {payload}, got {err:?}"
            );
        }
    }

    #[test]
    fn event_date_patch_states() {
        let keep = TimelineEdit::from_json(&json!({"items": []})).unwrap();
        assert_eq!(keep.event_date, DatePatch::Keep);

        let cleared = TimelineEdit::from_json(&json!({"items": [], "event_date": ""})).unwrap();
        assert_eq!(cleared.event_date, DatePatch::Clear);

        let nulled = TimelineEdit::from_json(&json!({"items": [], "event_date": null})).unwrap();
        assert_eq!(nulled.event_date, DatePatch::Clear);

        let set =
            TimelineEdit::from_json(&json!({"items": [], "event_date": "2026-09-12"})).unwrap();
        assert_eq!(
            set.event_date,
            DatePatch::Set(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap())
        );
    }

    #[test]
    fn malformed_event_date_is_rejected() {
        let err = TimelineEdit::from_json(&json!({"items": [], "event_date": "next june"}))
            .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));

        let err = TimelineEdit::from_json(&json!({"items": [], "event_date": 20260612}))
            .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));
    }

    #[test]
    fn title_is_taken_verbatim() {
        let edit =
            TimelineEdit::from_json(&json!({"items": [], "title": "Sam & Alex"})).unwrap();
        assert_eq!(edit.title.as_deref(), Some("Sam & Alex"));

        let err = TimelineEdit::from_json(&json!({"items": [], "title": 7})).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));
    }
}
