//! Short-form classification from ISO-8601 `PT#H#M#S` durations.

use std::sync::LazyLock;

use regex::Regex;

/// Longest duration, in seconds, that still counts as a Short.
pub const SHORT_MAX_SECS: u64 = 60;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("valid duration regex")
});

/// Total seconds for a `PT[nH][nM][nS]` duration.
///
/// Absent components count as zero, so `"PT"` is `Some(0)`. Returns `None`
/// when the string does not have that shape (day components, fractional
/// seconds, lowercase designators, empty input).
#[must_use]
pub fn parse_duration_secs(raw: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(raw)?;
    let component = |idx: usize| -> Option<u64> {
        caps.get(idx)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;

    Some(
        hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds),
    )
}

/// Whether a video with this duration is a Short. Unparseable input is not.
#[must_use]
pub fn is_short(raw: &str) -> bool {
    parse_duration_secs(raw).is_some_and(|secs| secs <= SHORT_MAX_SECS)
}
