//! Today's email records.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// One processed email, as served by the backend.
///
/// Records are values: a refresh replaces the whole collection and nothing in
/// the client edits a record after it is received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    /// Message id.
    pub id: String,
    /// Sender address or display name.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Date header.
    pub date: MessageDate,
    /// Generated thread summary.
    pub summary: String,
    /// Whether the thread has been replied to.
    #[serde(default)]
    pub replied: bool,
    /// Suggested reply draft.
    #[serde(default)]
    pub draft_reply: String,
    /// Priority tag.
    #[serde(default)]
    pub priority: Priority,
    /// Thread the message belongs to.
    pub thread_id: String,
}

/// A date header with its parsed timestamp when it could be understood.
///
/// Accepts RFC 3339 and RFC 2822 (a trailing zone comment such as `(IST)` is
/// ignored). Anything else is kept only as the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MessageDate {
    raw: String,
    parsed: Option<DateTime<FixedOffset>>,
}

impl MessageDate {
    /// Parses a date header.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_header_date(&raw);
        Self { raw, parsed }
    }

    /// Returns the string as received.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.parsed
    }

    /// Formats the timestamp in local time, falling back to the raw string.
    #[must_use]
    pub fn to_local_string(&self) -> String {
        self.parsed.map_or_else(
            || self.raw.clone(),
            |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

impl From<String> for MessageDate {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<MessageDate> for String {
    fn from(date: MessageDate) -> Self {
        date.raw
    }
}

fn parse_header_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    DateTime::parse_from_rfc2822(strip_zone_comment(trimmed)).ok()
}

// "Fri, 8 Aug 2025 03:58:49 +0530 (IST)" -> "Fri, 8 Aug 2025 03:58:49 +0530"
fn strip_zone_comment(value: &str) -> &str {
    if value.ends_with(')')
        && let Some(open) = value.rfind('(')
    {
        return value[..open].trim_end();
    }
    value
}

/// Priority tag assigned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    /// Urgent, action required.
    High,
    /// Follow-ups, requests, meetings.
    Medium,
    /// Everything else.
    #[default]
    Low,
    /// Unrecognised tag, kept verbatim.
    Other(String),
}

impl Priority {
    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Priority {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(tag),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
