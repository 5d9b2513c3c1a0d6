//! Ordered chain of narrowing filters applied to joined video records.
//!
//! Only stages whose field is set on the [`FilterSpec`] are built, always in
//! the same order: views (min, max), subscribers (min, max), Shorts, channel
//! age. Each stage keeps the relative order of the records it passes.

use chrono::{DateTime, Utc};

use crate::filters::FilterSpec;
use crate::video::VideoRecord;

/// Half-width of the band used when `min_views == max_views`, as a divisor
/// of the requested count (10 => ±10%).
const EQUAL_VIEWS_TOLERANCE_DIVISOR: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    MinViews(u64),
    MaxViews(u64),
    MinSubscribers(u64),
    MaxSubscribers(u64),
    ExcludeShorts,
    /// Keeps channels created at or before `cutoff`.
    ChannelAge {
        cutoff: DateTime<Utc>,
    },
}

impl FilterStage {
    #[must_use]
    pub fn matches(&self, record: &VideoRecord) -> bool {
        match *self {
            FilterStage::MinViews(min) => record.view_count >= min,
            FilterStage::MaxViews(max) => record.view_count <= max,
            FilterStage::MinSubscribers(min) => record.subscriber_count >= min,
            FilterStage::MaxSubscribers(max) => record.subscriber_count <= max,
            FilterStage::ExcludeShorts => !record.is_short,
            FilterStage::ChannelAge { cutoff } => record
                .channel_published_at
                .is_some_and(|created| created <= cutoff),
        }
    }

    /// Keeps the records this stage matches, in their original order.
    #[must_use]
    pub fn apply(&self, mut records: Vec<VideoRecord>) -> Vec<VideoRecord> {
        records.retain(|r| self.matches(r));
        records
    }
}

impl FilterSpec {
    /// The active filter stages, in application order.
    ///
    /// Equal min and max views widen into a ±10% band around that value.
    #[must_use]
    pub fn stages(&self, now: DateTime<Utc>) -> Vec<FilterStage> {
        let mut stages = Vec::new();

        let (min_views, max_views) = match (self.min_views, self.max_views) {
            (Some(min), Some(max)) if min == max => {
                let slack = min / EQUAL_VIEWS_TOLERANCE_DIVISOR;
                (Some(min - slack), Some(max.saturating_add(slack)))
            }
            bounds => bounds,
        };

        if let Some(min) = min_views {
            stages.push(FilterStage::MinViews(min));
        }
        if let Some(max) = max_views {
            stages.push(FilterStage::MaxViews(max));
        }
        if let Some(min) = self.min_subscribers {
            stages.push(FilterStage::MinSubscribers(min));
        }
        if let Some(max) = self.max_subscribers {
            stages.push(FilterStage::MaxSubscribers(max));
        }
        if !self.include_shorts {
            stages.push(FilterStage::ExcludeShorts);
        }
        if let Some(bucket) = self.channel_age {
            stages.push(FilterStage::ChannelAge {
                cutoff: bucket.cutoff(now),
            });
        }

        stages
    }
}

/// Runs every active stage of `spec` over `records`.
#[must_use]
pub fn apply_filters(
    records: Vec<VideoRecord>,
    spec: &FilterSpec,
    now: DateTime<Utc>,
) -> Vec<VideoRecord> {
    spec.stages(now).iter().fold(records, |remaining, stage| {
        let before = remaining.len();
        let kept = stage.apply(remaining);
        tracing::debug!(?stage, before, after = kept.len(), "filter stage applied");
        kept
    })
}
