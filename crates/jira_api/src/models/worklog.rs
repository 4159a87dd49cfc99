use chrono::{DateTime, FixedOffset, ParseResult};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorklogAuthor {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub author: WorklogAuthor,
    /// Kept verbatim so a single malformed timestamp does not fail the whole page.
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: u64,
}

impl WorklogEntry {
    /// Parses `started`, which Jira sends as `2024-01-01T09:00:00.000+0000`.
    pub fn started_at(&self) -> ParseResult<DateTime<FixedOffset>> {
        let value = self.started.trim();
        DateTime::parse_from_rfc3339(value)
            .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
    }
}
