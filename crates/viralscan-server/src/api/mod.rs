mod history;
mod search;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use viralscan_core::{AppConfig, HistoryError, SearchHistoryStore, DEFAULT_BATCH_SIZE};
use viralscan_youtube::{YoutubeClient, YoutubeError};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Per-request search defaults taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub default_max_results: u32,
    pub history_batch_size: usize,
}

impl SearchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_max_results: config.default_max_results,
            history_batch_size: config.history_batch_size,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_max_results: viralscan_core::DEFAULT_MAX_RESULTS,
            history_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub youtube: Arc<YoutubeClient>,
    pub history: Arc<dyn SearchHistoryStore>,
    pub settings: SearchSettings,
}

/// Failure envelope shared by every route: `{success: false, error, code}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct HealthData {
    status: &'static str,
    youtube_api_key: &'static str,
    request_id: String,
    timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<YoutubeError> for ApiError {
    fn from(error: YoutubeError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

impl From<HistoryError> for ApiError {
    fn from(error: HistoryError) -> Self {
        let code = match &error {
            HistoryError::MissingUser => "validation_error",
            HistoryError::SearchNotFound(_) => "not_found",
            HistoryError::Poisoned => {
                tracing::error!(error = %error, "history store unavailable");
                "internal_error"
            }
        };
        Self::new(code, error.to_string())
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-user-id"),
        ])
}

fn search_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/youtube-search", post(search::youtube_search))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/searches",
            get(history::list_searches).delete(history::clear_history),
        )
        .route(
            "/api/v1/searches/{search_id}",
            delete(history::delete_search),
        )
        .route(
            "/api/v1/searches/{search_id}/results",
            get(history::list_search_results),
        );

    Router::new()
        .merge(public_routes)
        .merge(search_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let youtube_api_key = if state.youtube.has_api_key() {
        "configured"
    } else {
        tracing::warn!("health check: YOUTUBE_API_KEY is not configured");
        "missing"
    };

    Json(HealthData {
        status: "ok",
        youtube_api_key,
        request_id: req_id.0,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
