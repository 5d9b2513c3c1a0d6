//! `YouTube` Data API v3 client and the search aggregation pipeline built on it.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod join;
pub mod types;

pub use aggregate::{search_videos, search_videos_at};
pub use client::YoutubeClient;
pub use error::YoutubeError;
