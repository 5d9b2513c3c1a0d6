//! The joined per-video record returned to callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video joined with its channel, as returned to callers.
///
/// Constructed once per request from upstream data and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    /// Thumbnail URL keyed by resolution tier (`default`, `medium`, `high`, ...).
    pub thumbnail_urls: BTreeMap<String, String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub subscriber_count: u64,
    /// `None` when the channel lookup returned nothing for this video.
    pub channel_published_at: Option<DateTime<Utc>>,
    pub is_short: bool,
    pub duration_raw: String,
}

impl VideoRecord {
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Medium thumbnail, then default, then whatever tier is present.
    #[must_use]
    pub fn preferred_thumbnail(&self) -> Option<&str> {
        self.thumbnail_urls
            .get("medium")
            .or_else(|| self.thumbnail_urls.get("default"))
            .or_else(|| self.thumbnail_urls.values().next())
            .map(String::as_str)
    }
}
