//! Search history persistence interface.
//!
//! The service records a search (keyword, resolved filters, owning user) and
//! then its result rows keyed by the generated search id. Both operations
//! are plain inserts. [`MemoryHistoryStore`] is the in-process adapter used
//! by the server; a database-backed store implements the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::filters::FilterSpec;
use crate::video::VideoRecord;

/// Result rows written per insert.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("user id is required to record search history")]
    MissingUser,

    #[error("search {0} not found")]
    SearchNotFound(Uuid),

    #[error("history store lock poisoned")]
    Poisoned,
}

/// A search about to be recorded.
#[derive(Debug, Clone)]
pub struct NewSearch {
    pub user_id: String,
    pub keyword: String,
    pub filters: FilterSpec,
}

impl NewSearch {
    #[must_use]
    pub fn new(user_id: &str, filters: &FilterSpec) -> Self {
        Self {
            user_id: user_id.trim().to_string(),
            keyword: filters.keyword.clone(),
            filters: filters.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: Uuid,
    pub user_id: String,
    pub keyword: String,
    pub filters: FilterSpec,
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Case-insensitive substring match on the keyword. A blank query
    /// matches every search.
    #[must_use]
    pub fn matches_keyword(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || self
                .keyword
                .to_lowercase()
                .contains(&query.to_lowercase())
    }
}

/// One persisted result, flattened from a [`VideoRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub search_id: Uuid,
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub subscribers: u64,
    pub published_at: Option<DateTime<Utc>>,
}

impl ResultRow {
    #[must_use]
    pub fn from_record(search_id: Uuid, record: &VideoRecord) -> Self {
        let or_placeholder = |value: &str, placeholder: &str| {
            if value.trim().is_empty() {
                placeholder.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            search_id,
            video_id: record.video_id.clone(),
            title: or_placeholder(&record.title, "Untitled"),
            channel_id: record.channel_id.clone(),
            channel_name: or_placeholder(&record.channel_title, "Unknown channel"),
            thumbnail_url: record.preferred_thumbnail().map(ToOwned::to_owned),
            video_url: record.watch_url(),
            views: record.view_count,
            likes: record.like_count,
            comments: record.comment_count,
            subscribers: record.subscriber_count,
            published_at: record.published_at,
        }
    }
}

pub trait SearchHistoryStore: Send + Sync {
    /// Records a search and returns it with its generated id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::MissingUser`] for a blank user id.
    fn insert_search(&self, search: NewSearch) -> Result<SearchRecord, HistoryError>;

    /// Appends result rows to an existing search.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::SearchNotFound`] if `search_id` is unknown.
    fn insert_results(&self, search_id: Uuid, rows: &[ResultRow]) -> Result<(), HistoryError>;

    /// A user's searches, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the store cannot be read.
    fn list_searches(&self, user_id: &str) -> Result<Vec<SearchRecord>, HistoryError>;

    /// The rows saved for one search, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::SearchNotFound`] if `search_id` is unknown.
    fn list_results(&self, search_id: Uuid) -> Result<Vec<ResultRow>, HistoryError>;

    /// Looks up a single search by id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::SearchNotFound`] if `search_id` is unknown.
    fn get_search(&self, search_id: Uuid) -> Result<SearchRecord, HistoryError>;

    /// Removes one search and its rows.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::SearchNotFound`] if `search_id` is unknown or
    /// belongs to another user.
    fn delete_search(&self, user_id: &str, search_id: Uuid) -> Result<(), HistoryError>;

    /// Removes every search of `user_id` and their rows. Returns how many
    /// searches were removed.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the store cannot be written.
    fn clear_history(&self, user_id: &str) -> Result<usize, HistoryError>;
}

/// Writes `records` as result rows of `search_id`, `batch_size` rows per
/// insert. Stops at the first failing batch; earlier batches stay written.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Propagates the first [`HistoryError`] returned by the store.
pub fn save_results(
    store: &dyn SearchHistoryStore,
    search_id: Uuid,
    records: &[VideoRecord],
    batch_size: usize,
) -> Result<usize, HistoryError> {
    let rows: Vec<ResultRow> = records
        .iter()
        .map(|r| ResultRow::from_record(search_id, r))
        .collect();

    let mut written = 0;
    for (index, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        store.insert_results(search_id, batch)?;
        written += batch.len();
        tracing::debug!(%search_id, batch = index + 1, rows = batch.len(), "saved result batch");
    }
    Ok(written)
}

#[derive(Debug, Default)]
struct MemoryInner {
    searches: Vec<SearchRecord>,
    results: HashMap<Uuid, Vec<ResultRow>>,
}

/// In-process [`SearchHistoryStore`]. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchHistoryStore for MemoryHistoryStore {
    fn insert_search(&self, search: NewSearch) -> Result<SearchRecord, HistoryError> {
        if search.user_id.trim().is_empty() {
            return Err(HistoryError::MissingUser);
        }

        let record = SearchRecord {
            id: Uuid::new_v4(),
            user_id: search.user_id,
            keyword: search.keyword,
            filters: search.filters,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().map_err(|_| HistoryError::Poisoned)?;
        inner.results.insert(record.id, Vec::new());
        inner.searches.push(record.clone());
        Ok(record)
    }

    fn insert_results(&self, search_id: Uuid, rows: &[ResultRow]) -> Result<(), HistoryError> {
        let mut inner = self.inner.write().map_err(|_| HistoryError::Poisoned)?;
        let saved = inner
            .results
            .get_mut(&search_id)
            .ok_or(HistoryError::SearchNotFound(search_id))?;
        saved.extend_from_slice(rows);
        Ok(())
    }

    fn list_searches(&self, user_id: &str) -> Result<Vec<SearchRecord>, HistoryError> {
        let inner = self.inner.read().map_err(|_| HistoryError::Poisoned)?;
        Ok(inner
            .searches
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_results(&self, search_id: Uuid) -> Result<Vec<ResultRow>, HistoryError> {
        let inner = self.inner.read().map_err(|_| HistoryError::Poisoned)?;
        inner
            .results
            .get(&search_id)
            .cloned()
            .ok_or(HistoryError::SearchNotFound(search_id))
    }

    fn get_search(&self, search_id: Uuid) -> Result<SearchRecord, HistoryError> {
        let inner = self.inner.read().map_err(|_| HistoryError::Poisoned)?;
        inner
            .searches
            .iter()
            .find(|s| s.id == search_id)
            .cloned()
            .ok_or(HistoryError::SearchNotFound(search_id))
    }

    fn delete_search(&self, user_id: &str, search_id: Uuid) -> Result<(), HistoryError> {
        let mut inner = self.inner.write().map_err(|_| HistoryError::Poisoned)?;
        let position = inner
            .searches
            .iter()
            .position(|s| s.id == search_id && s.user_id == user_id)
            .ok_or(HistoryError::SearchNotFound(search_id))?;
        inner.searches.remove(position);
        inner.results.remove(&search_id);
        Ok(())
    }

    fn clear_history(&self, user_id: &str) -> Result<usize, HistoryError> {
        let mut inner = self.inner.write().map_err(|_| HistoryError::Poisoned)?;
        let MemoryInner { searches, results } = &mut *inner;

        let before = searches.len();
        searches.retain(|s| {
            let owned = s.user_id == user_id;
            if owned {
                results.remove(&s.id);
            }
            !owned
        });
        Ok(before - searches.len())
    }
}
