//! Page controllers and the view models they produce.
//!
//! Controllers never touch a rendering substrate. Each rendered element that
//! reacts to the viewer carries an explicit action keyed by note or file id,
//! and the host hands that action back to the controller's `dispatch`.

mod auth_form;
mod note_editor;
mod notes_list;

pub use auth_form::*;
pub use note_editor::*;
pub use notes_list::*;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Characters of note content shown in a list card.
pub const PREVIEW_CHARS: usize = 100;

/// Format a backend timestamp for display in `tz`.
///
/// Accepts RFC 3339 and naive ISO timestamps (taken as UTC). Anything else is
/// shown as received.
pub fn format_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        });

    match parsed {
        Ok(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Format a backend timestamp in the viewer's local time zone.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

/// First `PREVIEW_CHARS` characters of `content`, followed by an ellipsis.
pub fn preview(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}
