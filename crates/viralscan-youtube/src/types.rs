//! `YouTube` Data API v3 response types.
//!
//! Only the fields the aggregator reads are modelled. Statistics arrive as
//! decimal strings and may be missing entirely (hidden like counts, disabled
//! comments), so every field is optional or defaulted.

use std::collections::BTreeMap;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// search.list
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

/// `id` object of a search hit. Only video hits carry `videoId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

// ---------------------------------------------------------------------------
// videos.list
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
    #[serde(default)]
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: BTreeMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoContentDetails {
    /// ISO-8601 duration such as `PT4M13S`.
    #[serde(default)]
    pub duration: String,
}

// ---------------------------------------------------------------------------
// channels.list
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ChannelListResponse {
    /// Omitted by the API when none of the requested ids exist.
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    /// Channel creation time.
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default)]
    pub subscriber_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_item_tolerates_missing_sections() {
        let item: VideoItem = serde_json::from_value(serde_json::json!({ "id": "abc" }))
            .expect("bare video item should parse");
        assert_eq!(item.id, "abc");
        assert!(item.statistics.is_none());
        assert!(item.content_details.is_none());
        assert!(item.snippet.thumbnails.is_empty());
    }

    #[test]
    fn channel_list_without_items_is_empty() {
        let resp: ChannelListResponse =
            serde_json::from_value(serde_json::json!({ "kind": "youtube#channelListResponse" }))
                .unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn search_item_without_video_id_parses() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "id": { "kind": "youtube#channel", "channelId": "UC1" }
        }))
        .unwrap();
        assert!(item.id.video_id.is_none());
    }
}
