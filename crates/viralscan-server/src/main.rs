mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use viralscan_core::MemoryHistoryStore;
use viralscan_youtube::YoutubeClient;

use crate::{
    api::{build_app, AppState, SearchSettings},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = viralscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting viralscan server");

    let youtube = YoutubeClient::from_config(&config)?;
    if !youtube.has_api_key() {
        tracing::warn!("YOUTUBE_API_KEY is not set; searches will fail until it is configured");
    }

    let state = AppState {
        youtube: Arc::new(youtube),
        history: Arc::new(MemoryHistoryStore::new()),
        settings: SearchSettings::from_config(&config),
    };
    let app = build_app(state, RateLimitState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
