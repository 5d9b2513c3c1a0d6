use thiserror::Error;

/// Errors returned by the `YouTube` client and the aggregation pipeline.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// No API key was configured. Raised before any request is sent.
    #[error("YouTube API key is not configured (set YOUTUBE_API_KEY)")]
    MissingApiKey,

    /// The configured base URL could not be parsed.
    #[error("invalid YouTube API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] viralscan_core::ValidationError),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `body` is the response body
    /// as received.
    #[error("YouTube API error from {endpoint} (HTTP {status}): {body}")]
    Upstream {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl YoutubeError {
    /// Stable machine-readable error category, as reported to API callers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::MissingApiKey | Self::InvalidBaseUrl { .. } => "configuration_error",
            Self::Upstream { .. } | Self::Http(_) | Self::Deserialize { .. } => "upstream_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_group_errors_by_category() {
        assert_eq!(YoutubeError::MissingApiKey.code(), "configuration_error");
        assert_eq!(
            YoutubeError::Validation(viralscan_core::ValidationError::EmptyKeyword).code(),
            "validation_error"
        );
        let upstream = YoutubeError::Upstream {
            endpoint: "search",
            status: 403,
            body: "quotaExceeded".to_string(),
        };
        assert_eq!(upstream.code(), "upstream_error");
        assert!(upstream.to_string().contains("quotaExceeded"));
    }
}
