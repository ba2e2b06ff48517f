//! Plain-text rendering of a timeline, suitable for pasting into an email
//! or printing.

use chrono::NaiveDate;

use crate::schedule::ScheduleItem;

/// Heading used when a project has no title.
pub const DEFAULT_TITLE: &str = "Wedding Timeline";

/// Render a title line, an optional long-form date line, a blank line, then
/// one `time – label` line per item.
pub fn render_plain_text(title: &str, event_date: Option<NaiveDate>, items: &[ScheduleItem]) -> String {
    let title = match title.trim() {
        "" => DEFAULT_TITLE,
        t => t,
    };
    let date = event_date
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default();

    let mut lines = vec![title.to_owned(), date, String::new()];
    lines.extend(items.iter().map(|item| format!("{} – {}", item.time, item.label)));
    lines.join("\n")
}
