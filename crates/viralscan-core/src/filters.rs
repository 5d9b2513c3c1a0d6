//! The inbound search request and the typed filter specification built from it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Candidates requested from the upstream search when the caller sends none.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Page size ceiling of the upstream search endpoint.
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Rejections raised before any network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("keyword is required")]
    EmptyKeyword,

    #[error("invalid sort order \"{0}\" (expected relevance, views or subscribers)")]
    InvalidSortBy(String),

    #[error("invalid channel age \"{0}\" (expected 1day, 7days, 15days, 30days, 2months or 3months)")]
    InvalidChannelAge(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Upstream order, untouched.
    #[default]
    Relevance,
    Views,
    Subscribers,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Views => "views",
            SortBy::Subscribers => "subscribers",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "views" => Ok(SortBy::Views),
            "subscribers" => Ok(SortBy::Subscribers),
            _ => Err(ValidationError::InvalidSortBy(s.to_string())),
        }
    }
}

/// Minimum time a channel must have existed for its videos to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelAgeBucket {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "15days")]
    FifteenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "2months")]
    TwoMonths,
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl ChannelAgeBucket {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelAgeBucket::OneDay => "1day",
            ChannelAgeBucket::SevenDays => "7days",
            ChannelAgeBucket::FifteenDays => "15days",
            ChannelAgeBucket::ThirtyDays => "30days",
            ChannelAgeBucket::TwoMonths => "2months",
            ChannelAgeBucket::ThreeMonths => "3months",
        }
    }

    /// Resolves the bucket to an absolute cutoff relative to `now`.
    ///
    /// Day buckets subtract whole days; month buckets subtract calendar
    /// months, clamping to the end of shorter months.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months = |n: u32| {
            now.checked_sub_months(Months::new(n))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        };
        match self {
            ChannelAgeBucket::OneDay => now - Duration::days(1),
            ChannelAgeBucket::SevenDays => now - Duration::days(7),
            ChannelAgeBucket::FifteenDays => now - Duration::days(15),
            ChannelAgeBucket::ThirtyDays => now - Duration::days(30),
            ChannelAgeBucket::TwoMonths => months(2),
            ChannelAgeBucket::ThreeMonths => months(3),
        }
    }
}

impl fmt::Display for ChannelAgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelAgeBucket {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1day" => Ok(ChannelAgeBucket::OneDay),
            "7days" => Ok(ChannelAgeBucket::SevenDays),
            "15days" => Ok(ChannelAgeBucket::FifteenDays),
            "30days" => Ok(ChannelAgeBucket::ThirtyDays),
            "2months" => Ok(ChannelAgeBucket::TwoMonths),
            "3months" => Ok(ChannelAgeBucket::ThreeMonths),
            _ => Err(ValidationError::InvalidChannelAge(s.to_string())),
        }
    }
}

/// Search payload as sent by the web client. Every field but `keyword` is
/// optional and may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub min_views: Option<u64>,
    #[serde(default)]
    pub max_views: Option<u64>,
    #[serde(default)]
    pub min_subscribers: Option<u64>,
    #[serde(default)]
    pub max_subscribers: Option<u64>,
    #[serde(default)]
    pub include_shorts: Option<bool>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub channel_age: Option<ChannelAgeBucket>,
}

impl SearchRequest {
    /// Validates the payload and resolves defaults.
    ///
    /// `default_max_results` is used when the caller sends no `maxResults`;
    /// any value is then clamped to `1..=MAX_RESULTS_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyKeyword`] when the keyword is absent
    /// or blank.
    pub fn into_filter_spec(self, default_max_results: u32) -> Result<FilterSpec, ValidationError> {
        let keyword = self
            .keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ValidationError::EmptyKeyword)?;

        Ok(FilterSpec {
            keyword,
            min_views: self.min_views,
            max_views: self.max_views,
            min_subscribers: self.min_subscribers,
            max_subscribers: self.max_subscribers,
            include_shorts: self.include_shorts.unwrap_or(true),
            max_result_count: normalize_max_results(
                self.max_results.unwrap_or(default_max_results),
            ),
            region_code: non_blank(self.country),
            language_code: non_blank(self.language),
            sort_by: self.sort_by.unwrap_or_default(),
            channel_age: self.channel_age,
        })
    }
}

/// Fully resolved, immutable search constraints for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub keyword: String,
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
    pub min_subscribers: Option<u64>,
    pub max_subscribers: Option<u64>,
    pub include_shorts: bool,
    pub max_result_count: u32,
    pub region_code: Option<String>,
    pub language_code: Option<String>,
    pub sort_by: SortBy,
    pub channel_age: Option<ChannelAgeBucket>,
}

impl FilterSpec {
    /// Only the keyword set, every filter inactive, default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyKeyword`] for a blank keyword.
    pub fn for_keyword(keyword: &str) -> Result<Self, ValidationError> {
        SearchRequest {
            keyword: Some(keyword.to_string()),
            ..SearchRequest::default()
        }
        .into_filter_spec(DEFAULT_MAX_RESULTS)
    }
}

pub(crate) fn normalize_max_results(requested: u32) -> u32 {
    requested.clamp(1, MAX_RESULTS_LIMIT)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
