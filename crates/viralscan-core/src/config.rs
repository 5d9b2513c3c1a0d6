use crate::app_config::{AppConfig, Environment};
use crate::filters::MAX_RESULTS_LIMIT;
use crate::ConfigError;

pub(crate) const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("VIRALSCAN_ENV", "development"));

    let bind_addr = or_default("VIRALSCAN_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("VIRALSCAN_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("VIRALSCAN_LOG_LEVEL", "info");

    let youtube_api_key = lookup("YOUTUBE_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let youtube_api_base_url = or_default("YOUTUBE_API_BASE_URL", DEFAULT_YOUTUBE_API_BASE_URL);
    let youtube_request_timeout_secs = parse_u64("YOUTUBE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VIRALSCAN_USER_AGENT", "viralscan/0.1 (video-discovery)");

    let default_max_results = or_default("VIRALSCAN_DEFAULT_MAX_RESULTS", "20")
        .parse::<u32>()
        .map_err(|e| invalid("VIRALSCAN_DEFAULT_MAX_RESULTS", e.to_string()))?;
    if !(1..=MAX_RESULTS_LIMIT).contains(&default_max_results) {
        return Err(invalid(
            "VIRALSCAN_DEFAULT_MAX_RESULTS",
            format!("must be between 1 and {MAX_RESULTS_LIMIT}"),
        ));
    }

    let history_batch_size = parse_usize("VIRALSCAN_HISTORY_BATCH_SIZE", "50")?;
    if history_batch_size == 0 {
        return Err(invalid(
            "VIRALSCAN_HISTORY_BATCH_SIZE",
            "must be greater than zero".to_string(),
        ));
    }

    let rate_limit_max_requests = parse_usize("VIRALSCAN_RATE_LIMIT_MAX_REQUESTS", "60")?;
    if rate_limit_max_requests == 0 {
        return Err(invalid(
            "VIRALSCAN_RATE_LIMIT_MAX_REQUESTS",
            "must be greater than zero".to_string(),
        ));
    }

    let rate_limit_window_secs = parse_u64("VIRALSCAN_RATE_LIMIT_WINDOW_SECS", "60")?;
    if rate_limit_window_secs == 0 {
        return Err(invalid(
            "VIRALSCAN_RATE_LIMIT_WINDOW_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        youtube_api_key,
        youtube_api_base_url,
        youtube_request_timeout_secs,
        user_agent,
        default_max_results,
        history_batch_size,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
