use clap::Args;
use viralscan_core::{AppConfig, ChannelAgeBucket, SearchRequest, SortBy};
use viralscan_youtube::YoutubeClient;

use crate::render;

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Search keyword.
    pub keyword: String,

    #[arg(long)]
    pub min_views: Option<u64>,

    #[arg(long)]
    pub max_views: Option<u64>,

    #[arg(long)]
    pub min_subscribers: Option<u64>,

    #[arg(long)]
    pub max_subscribers: Option<u64>,

    /// Drop videos of 60 seconds or less.
    #[arg(long)]
    pub no_shorts: bool,

    /// Upper bound on candidates fetched from the search call (1-50).
    #[arg(long)]
    pub max_results: Option<u32>,

    /// ISO 3166-1 region hint, e.g. `BR`.
    #[arg(long)]
    pub country: Option<String>,

    /// Relevance language hint, e.g. `pt`.
    #[arg(long)]
    pub language: Option<String>,

    /// relevance, views or subscribers.
    #[arg(long)]
    pub sort_by: Option<SortBy>,

    /// Only channels at least this old: 1day, 7days, 15days, 30days,
    /// 2months or 3months.
    #[arg(long)]
    pub channel_age: Option<ChannelAgeBucket>,

    /// Print the JSON response instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub(crate) fn to_request(&self) -> SearchRequest {
        SearchRequest {
            keyword: Some(self.keyword.clone()),
            min_views: self.min_views,
            max_views: self.max_views,
            min_subscribers: self.min_subscribers,
            max_subscribers: self.max_subscribers,
            include_shorts: Some(!self.no_shorts),
            max_results: self.max_results,
            country: self.country.clone(),
            language: self.language.clone(),
            sort_by: self.sort_by,
            channel_age: self.channel_age,
        }
    }
}

/// Runs one search against the live API and prints the results.
///
/// # Errors
///
/// Returns an error for a blank keyword, missing API key, or any failed
/// upstream call. With `--json` the failure envelope is printed first.
pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let spec = args.to_request().into_filter_spec(config.default_max_results)?;
    let client = YoutubeClient::from_config(config)?;

    match viralscan_youtube::search_videos(&client, &spec).await {
        Ok(results) => {
            if args.json {
                println!("{}", render::success_json(&results)?);
            } else {
                print!("{}", render::table(&spec, &results));
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, code = e.code(), "search failed");
            if args.json {
                println!("{}", render::failure_json(e.code(), &e.to_string())?);
            }
            Err(e.into())
        }
    }
}
