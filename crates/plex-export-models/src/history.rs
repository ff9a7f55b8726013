use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from a Plex library section's watch history.
///
/// History responses are sparse: the title is always present, but year and
/// viewed timestamp may be missing, and the rating key may no longer point
/// at a live library item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub title: String,
    pub rating_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}
