use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Serialize;
use viralscan_core::{
    save_results, FilterSpec, NewSearch, SearchHistoryStore, SearchRequest, VideoRecord,
};

use super::{ApiError, AppState};
use crate::middleware::{user_id_from_headers, RequestId};

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    success: bool,
    count: usize,
    results: Vec<VideoRecord>,
}

/// `POST /api/v1/youtube-search`
///
/// Runs the search pipeline and, when the caller identifies itself with
/// `x-user-id`, records the search and its results. Recording failures are
/// logged and never fail the search.
pub(super) async fn youtube_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected search body");
        ApiError::new("validation_error", rejection.body_text())
    })?;

    let spec = request
        .into_filter_spec(state.settings.default_max_results)
        .map_err(|e| ApiError::new("validation_error", e.to_string()))?;

    tracing::info!(
        request_id = %req_id.0,
        keyword = %spec.keyword,
        sort_by = %spec.sort_by,
        max_results = spec.max_result_count,
        "youtube search requested"
    );

    let results = viralscan_youtube::search_videos(&state.youtube, &spec)
        .await
        .map_err(|e| {
            tracing::warn!(request_id = %req_id.0, error = %e, "youtube search failed");
            ApiError::from(e)
        })?;

    if let Some(user_id) = user_id_from_headers(&headers) {
        record_history(
            state.history.as_ref(),
            &user_id,
            &spec,
            &results,
            state.settings.history_batch_size,
        );
    }

    Ok(Json(SearchResponse {
        success: true,
        count: results.len(),
        results,
    }))
}

fn record_history(
    store: &dyn SearchHistoryStore,
    user_id: &str,
    spec: &FilterSpec,
    results: &[VideoRecord],
    batch_size: usize,
) {
    let search = match store.insert_search(NewSearch::new(user_id, spec)) {
        Ok(search) => search,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "failed to record search");
            return;
        }
    };

    match save_results(store, search.id, results, batch_size) {
        Ok(saved) => {
            tracing::debug!(search_id = %search.id, saved, "recorded search results");
        }
        Err(e) => {
            tracing::warn!(search_id = %search.id, error = %e, "failed to record search results");
        }
    }
}
