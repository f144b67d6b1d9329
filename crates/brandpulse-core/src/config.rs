use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
pub(crate) fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let content_api_url = require("BRANDPULSE_CONTENT_API_URL")?;
    let content_api_key = require("BRANDPULSE_CONTENT_API_KEY")?;
    let sentiment_url = require("BRANDPULSE_SENTIMENT_URL")?;

    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("BRANDPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let request_timeout_secs = parse_u64("BRANDPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let page_size = parse_u32("BRANDPULSE_PAGE_SIZE", "50")?;
    let rate_limit_max_requests = parse_usize("BRANDPULSE_RATE_LIMIT_MAX_REQUESTS", "100")?;
    let rate_limit_window_ms = parse_u64("BRANDPULSE_RATE_LIMIT_WINDOW_MS", "1000")?;
    let fetch_concurrency = parse_usize("BRANDPULSE_FETCH_CONCURRENCY", "8")?;
    let lookback_days = parse_i64("BRANDPULSE_LOOKBACK_DAYS", "30")?;
    let cache_retention_days = parse_i64("BRANDPULSE_CACHE_RETENTION_DAYS", "730")?;

    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BRANDPULSE_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if rate_limit_max_requests == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BRANDPULSE_RATE_LIMIT_MAX_REQUESTS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        log_level,
        content_api_url,
        content_api_key,
        sentiment_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        request_timeout_secs,
        page_size,
        rate_limit_max_requests,
        fetch_concurrency,
        rate_limit_window_ms,
        lookback_days,
        cache_retention_days,
    })
}
