//! Joins `YouTube` video and channel payloads into [`VideoRecord`]s.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use viralscan_core::{duration, VideoRecord};

use crate::types::{ChannelItem, VideoItem};

/// Channel ids referenced by `videos`, first-seen order, duplicates and
/// blanks removed.
#[must_use]
pub fn distinct_channel_ids(videos: &[VideoItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    videos
        .iter()
        .map(|v| v.snippet.channel_id.as_str())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(ToOwned::to_owned)
        .collect()
}

/// Parses an API statistic string, falling back to 0 when absent or invalid.
#[must_use]
pub fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
}

/// Parses an RFC 3339 timestamp such as `2021-04-03T10:00:00Z`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Builds one record per candidate id that the video-detail call returned,
/// in candidate order.
///
/// Videos missing from `videos` are dropped. A video whose channel is
/// missing from `channels` is kept with zero subscribers and no channel
/// creation date.
#[must_use]
pub fn join_records(
    candidates: &[String],
    videos: Vec<VideoItem>,
    channels: Vec<ChannelItem>,
) -> Vec<VideoRecord> {
    let mut videos_by_id: HashMap<String, VideoItem> =
        videos.into_iter().map(|v| (v.id.clone(), v)).collect();
    let channels_by_id: HashMap<String, ChannelItem> =
        channels.into_iter().map(|c| (c.id.clone(), c)).collect();

    candidates
        .iter()
        .filter_map(|id| videos_by_id.remove(id))
        .map(|video| {
            let channel = channels_by_id.get(&video.snippet.channel_id);
            to_record(video, channel)
        })
        .collect()
}

fn to_record(video: VideoItem, channel: Option<&ChannelItem>) -> VideoRecord {
    let stats = video.statistics.unwrap_or_default();
    let duration_raw = video.content_details.unwrap_or_default().duration;
    let snippet = video.snippet;

    let subscriber_count = parse_count(
        channel
            .and_then(|c| c.statistics.as_ref())
            .and_then(|s| s.subscriber_count.as_deref()),
    );
    let channel_published_at = channel
        .and_then(|c| c.snippet.published_at.as_deref())
        .and_then(parse_timestamp);

    VideoRecord {
        video_id: video.id,
        channel_id: snippet.channel_id,
        title: snippet.title,
        description: snippet.description,
        channel_title: snippet.channel_title,
        thumbnail_urls: snippet
            .thumbnails
            .into_iter()
            .map(|(tier, thumb)| (tier, thumb.url))
            .collect(),
        published_at: snippet.published_at.as_deref().and_then(parse_timestamp),
        view_count: parse_count(stats.view_count.as_deref()),
        like_count: parse_count(stats.like_count.as_deref()),
        comment_count: parse_count(stats.comment_count.as_deref()),
        subscriber_count,
        channel_published_at,
        is_short: duration::is_short(&duration_raw),
        duration_raw,
    }
}
