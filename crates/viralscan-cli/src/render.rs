//! Terminal and JSON output for search results.

use serde::Serialize;
use viralscan_core::{FilterSpec, VideoRecord};

const TITLE_WIDTH: usize = 48;
const CHANNEL_WIDTH: usize = 22;

#[derive(Debug, Serialize)]
struct SuccessEnvelope<'a> {
    success: bool,
    count: usize,
    results: &'a [VideoRecord],
}

#[derive(Debug, Serialize)]
struct FailureEnvelope<'a> {
    success: bool,
    error: &'a str,
    code: &'a str,
}

/// Abbreviates a count: `999`, `1.2K`, `3.4M`, `1.1B`.
pub(crate) fn format_count(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    for (scale, suffix) in UNITS {
        if n >= scale {
            let tenths = n / (scale / 10);
            return format!("{}.{}{suffix}", tenths / 10, tenths % 10);
        }
    }
    n.to_string()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        format!("{}...", s.chars().take(width - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Renders results as a fixed-width table with a one-line summary.
pub(crate) fn table(spec: &FilterSpec, results: &[VideoRecord]) -> String {
    if results.is_empty() {
        return format!("no videos matched \"{}\"\n", spec.keyword);
    }

    let mut lines = Vec::with_capacity(results.len() + 2);
    lines.push(format!(
        "{:<8}{:<8}{:<6}{:<title$}  {:<channel$}  URL",
        "VIEWS",
        "SUBS",
        "SHORT",
        "TITLE",
        "CHANNEL",
        title = TITLE_WIDTH,
        channel = CHANNEL_WIDTH,
    ));
    lines.extend(results.iter().map(|record| {
        format!(
            "{:<8}{:<8}{:<6}{:<title$}  {:<channel$}  {}",
            format_count(record.view_count),
            format_count(record.subscriber_count),
            if record.is_short { "yes" } else { "" },
            truncate(&record.title, TITLE_WIDTH),
            truncate(&record.channel_title, CHANNEL_WIDTH),
            record.watch_url(),
            title = TITLE_WIDTH,
            channel = CHANNEL_WIDTH,
        )
    }));
    lines.push(format!(
        "{} videos for \"{}\" sorted by {}",
        results.len(),
        spec.keyword,
        spec.sort_by
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub(crate) fn success_json(results: &[VideoRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SuccessEnvelope {
        success: true,
        count: results.len(),
        results,
    })
}

pub(crate) fn failure_json(code: &str, error: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FailureEnvelope {
        success: false,
        error,
        code,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use viralscan_core::SortBy;

    use super::*;

    fn record(id: &str, title: &str, views: u64, is_short: bool) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            channel_id: "UC1".to_string(),
            title: title.to_string(),
            description: String::new(),
            channel_title: "Kitchen".to_string(),
            thumbnail_urls: BTreeMap::new(),
            published_at: None,
            view_count: views,
            like_count: 0,
            comment_count: 0,
            subscriber_count: 3_400,
            channel_published_at: None,
            is_short,
            duration_raw: String::new(),
        }
    }

    #[test]
    fn format_count_abbreviates() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(3_450), "3.4K");
        assert_eq!(format_count(1_250_000), "1.2M");
        assert_eq!(format_count(999_999), "999.9K");
        assert_eq!(format_count(2_100_000_000), "2.1B");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ááááááááááá", 8), "ááááá...");
    }

    #[test]
    fn table_lists_each_result() {
        let spec = FilterSpec {
            sort_by: SortBy::Views,
            ..FilterSpec::for_keyword("bread").unwrap()
        };
        let out = table(
            &spec,
            &[record("a", "Sourdough", 1_250_000, false), record("b", "Quick", 900, true)],
        );
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("VIEWS"));
        assert!(lines[1].contains("1.2M") && lines[1].contains("3.4K"));
        assert!(lines[1].contains("https://www.youtube.com/watch?v=a"));
        assert!(lines[2].contains("yes"));
        assert_eq!(lines[3], "2 videos for \"bread\" sorted by views");
    }

    #[test]
    fn table_ends_with_exactly_one_newline() {
        let spec = FilterSpec::for_keyword("bread").unwrap();
        let out = table(&spec, &[record("a", "Sourdough", 10, false)]);

        assert!(out.ends_with("sorted by relevance\n"));
        assert!(!out.ends_with("\n\n"));
        assert_eq!(out.matches('\n').count(), 3);
    }

    #[test]
    fn empty_results_print_a_notice() {
        let spec = FilterSpec::for_keyword("nothing").unwrap();
        assert_eq!(table(&spec, &[]), "no videos matched \"nothing\"\n");
    }

    #[test]
    fn json_envelopes_match_api_shape() {
        let ok: serde_json::Value =
            serde_json::from_str(&success_json(&[record("a", "A", 1, false)]).unwrap()).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["count"], 1);
        assert_eq!(ok["results"][0]["videoId"], "a");

        let err: serde_json::Value =
            serde_json::from_str(&failure_json("upstream_error", "quota").unwrap()).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["code"], "upstream_error");
        assert_eq!(err["error"], "quota");
    }
}
