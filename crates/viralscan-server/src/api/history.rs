use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use viralscan_core::{HistoryError, ResultRow, SearchRecord};

use super::{ApiError, AppState};
use crate::middleware::user_id_from_headers;

#[derive(Debug, Serialize)]
pub(super) struct SearchListResponse {
    success: bool,
    count: usize,
    searches: Vec<SearchRecord>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResultsResponse {
    success: bool,
    search: SearchRecord,
    count: usize,
    results: Vec<ResultRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteResponse {
    success: bool,
    deleted: usize,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct HistoryQuery {
    /// Keyword substring filter.
    q: Option<String>,
}

fn require_user(headers: &HeaderMap) -> Result<String, ApiError> {
    user_id_from_headers(headers)
        .ok_or_else(|| ApiError::new("validation_error", "x-user-id header is required"))
}

fn parse_search_id(search_id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    search_id
        .map(|Path(id)| id)
        .map_err(|_| ApiError::new("validation_error", "search id must be a UUID"))
}

/// `GET /api/v1/searches`, the caller's searches newest first.
///
/// `?q=` keeps only searches whose keyword contains `q`, ignoring case.
pub(super) async fn list_searches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<SearchListResponse>, ApiError> {
    let user_id = require_user(&headers)?;
    let mut searches = state.history.list_searches(&user_id)?;
    if let Some(q) = query.q.as_deref() {
        searches.retain(|search| search.matches_keyword(q));
    }

    Ok(Json(SearchListResponse {
        success: true,
        count: searches.len(),
        searches,
    }))
}

/// `GET /api/v1/searches/{search_id}/results`
///
/// Searches owned by another user are reported as not found.
pub(super) async fn list_search_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    search_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SearchResultsResponse>, ApiError> {
    let user_id = require_user(&headers)?;
    let search_id = parse_search_id(search_id)?;

    let search = state.history.get_search(search_id)?;
    if search.user_id != user_id {
        return Err(HistoryError::SearchNotFound(search_id).into());
    }
    let results = state.history.list_results(search_id)?;

    Ok(Json(SearchResultsResponse {
        success: true,
        search,
        count: results.len(),
        results,
    }))
}

/// `DELETE /api/v1/searches/{search_id}`
pub(super) async fn delete_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    search_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let user_id = require_user(&headers)?;
    let search_id = parse_search_id(search_id)?;

    state.history.delete_search(&user_id, search_id)?;
    tracing::info!(%search_id, "search deleted");

    Ok(Json(DeleteResponse {
        success: true,
        deleted: 1,
    }))
}

/// `DELETE /api/v1/searches`, drops the caller's whole history.
pub(super) async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    let user_id = require_user(&headers)?;
    let deleted = state.history.clear_history(&user_id)?;
    tracing::info!(deleted, "search history cleared");

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}
