//! Domain types and pure logic for viral video discovery.
//!
//! Everything here is free of network I/O: the filter specification, the
//! joined video record, the duration classifier, the filter chain, sorting,
//! configuration loading, and the search-history interface.

mod app_config;
mod config;
pub mod duration;
pub mod filter;
pub mod filters;
pub mod history;
pub mod sort;
pub mod video;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{apply_filters, FilterStage};
pub use filters::{
    ChannelAgeBucket, FilterSpec, SearchRequest, SortBy, ValidationError, DEFAULT_MAX_RESULTS,
    MAX_RESULTS_LIMIT,
};
pub use history::{
    save_results, HistoryError, MemoryHistoryStore, NewSearch, ResultRow, SearchHistoryStore,
    SearchRecord, DEFAULT_BATCH_SIZE,
};
pub use sort::sort_records;
pub use video::VideoRecord;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
