//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with API key handling and typed response decoding for the
//! three endpoints the aggregator needs: `search`, `videos` and `channels`.
//! Every call is a single attempt; any non-2xx status is surfaced as
//! [`YoutubeError::Upstream`] carrying the response body.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use viralscan_core::{AppConfig, FilterSpec};

use crate::error::YoutubeError;
use crate::types::{
    ChannelItem, ChannelListResponse, SearchListResponse, VideoItem, VideoListResponse,
};

const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";
const CHANNEL_PARTS: &str = "snippet,statistics,contentDetails";

/// Client for the `YouTube` Data API.
///
/// The API key is optional at construction time. Each call checks for it
/// and fails with [`YoutubeError::MissingApiKey`] before touching the
/// network.
pub struct YoutubeClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the HTTP client cannot be built, or
    /// [`YoutubeError::InvalidBaseUrl`] for a malformed `YOUTUBE_API_BASE_URL`.
    pub fn from_config(config: &AppConfig) -> Result<Self, YoutubeError> {
        Self::with_base_url(
            config.youtube_api_key.as_deref(),
            config.youtube_request_timeout_secs,
            &config.user_agent,
            &config.youtube_api_base_url,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the HTTP client cannot be built, or
    /// [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so Url::join appends the resource instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToOwned::to_owned),
            base_url: parsed,
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Runs a keyword search restricted to videos and returns the candidate
    /// video ids in the order the API ranked them.
    ///
    /// Hits without a `videoId` are skipped.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::MissingApiKey`] if no key is configured.
    /// - [`YoutubeError::Upstream`] on a non-2xx status.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the body does not match.
    pub async fn search(&self, spec: &FilterSpec) -> Result<Vec<String>, YoutubeError> {
        let max_results = spec.max_result_count.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", spec.keyword.as_str()),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(region) = spec.region_code.as_deref() {
            params.push(("regionCode", region));
        }
        if let Some(language) = spec.language_code.as_deref() {
            params.push(("relevanceLanguage", language));
        }

        let url = self.build_url("search", &params)?;
        let response: SearchListResponse = self.get_json("search", url).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Fetches snippet, statistics and content details for a batch of videos
    /// in one request. An empty batch returns immediately.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::search`].
    pub async fn videos(&self, ids: &[String]) -> Result<Vec<VideoItem>, YoutubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let url = self.build_url(
            "videos",
            &[("part", VIDEO_PARTS), ("id", joined.as_str())],
        )?;
        let response: VideoListResponse = self.get_json("videos", url).await?;
        Ok(response.items)
    }

    /// Fetches snippet, statistics and content details for a batch of
    /// channels in one request.
    /// Callers pass distinct ids. An empty batch returns immediately.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::search`].
    pub async fn channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>, YoutubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let url = self.build_url(
            "channels",
            &[("part", CHANNEL_PARTS), ("id", joined.as_str())],
        )?;
        let response: ChannelListResponse = self.get_json("channels", url).await?;
        Ok(response.items)
    }

    fn api_key(&self) -> Result<&str, YoutubeError> {
        self.api_key.as_deref().ok_or(YoutubeError::MissingApiKey)
    }

    /// Builds `{base}/{resource}?{params}&key=...` with every value
    /// percent-encoded.
    fn build_url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let key = self.api_key()?;
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", key);
        }
        Ok(url)
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// The URL carries the API key, so errors are labelled with `endpoint`
    /// rather than the URL.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, YoutubeError> {
        tracing::debug!(endpoint, "calling YouTube API");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "YouTube API returned an error");
            return Err(YoutubeError::Upstream {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: endpoint.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
