//! The search aggregation pipeline.
//!
//! search -> video details -> channel details -> join -> filter -> sort.
//! The three calls run strictly in sequence; each needs ids from the
//! previous one. Any failure aborts the whole search; no partial result set
//! is ever returned.

use chrono::{DateTime, Utc};
use viralscan_core::{apply_filters, sort_records, FilterSpec, ValidationError, VideoRecord};

use crate::client::YoutubeClient;
use crate::error::YoutubeError;
use crate::join::{distinct_channel_ids, join_records};

/// Runs a full search using the current time for the channel-age cutoff.
///
/// # Errors
///
/// See [`search_videos_at`].
pub async fn search_videos(
    client: &YoutubeClient,
    spec: &FilterSpec,
) -> Result<Vec<VideoRecord>, YoutubeError> {
    search_videos_at(client, spec, Utc::now()).await
}

/// Runs a full search, resolving the channel-age cutoff against `now`.
///
/// Zero candidates from the search call is a successful empty result and
/// skips the detail calls.
///
/// # Errors
///
/// - [`YoutubeError::Validation`] for a blank keyword, before any request.
/// - [`YoutubeError::MissingApiKey`] when no key is configured.
/// - [`YoutubeError::Upstream`], [`YoutubeError::Http`] or
///   [`YoutubeError::Deserialize`] from whichever call failed first.
pub async fn search_videos_at(
    client: &YoutubeClient,
    spec: &FilterSpec,
    now: DateTime<Utc>,
) -> Result<Vec<VideoRecord>, YoutubeError> {
    if spec.keyword.trim().is_empty() {
        return Err(ValidationError::EmptyKeyword.into());
    }

    let candidates = client.search(spec).await?;
    if candidates.is_empty() {
        tracing::info!(keyword = %spec.keyword, "search returned no candidates");
        return Ok(Vec::new());
    }

    let videos = client.videos(&candidates).await?;
    let channel_ids = distinct_channel_ids(&videos);
    tracing::debug!(
        candidates = candidates.len(),
        videos = videos.len(),
        channels = channel_ids.len(),
        "fetched video details"
    );

    let channels = client.channels(&channel_ids).await?;

    let joined = join_records(&candidates, videos, channels);
    let joined_count = joined.len();
    let mut results = apply_filters(joined, spec, now);
    sort_records(&mut results, spec.sort_by);

    tracing::info!(
        keyword = %spec.keyword,
        joined = joined_count,
        results = results.len(),
        sort_by = %spec.sort_by,
        "search complete"
    );

    Ok(results)
}
