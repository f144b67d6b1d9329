//! Shared configuration and tuning constants for BrandPulse.
//!
//! Everything here is plain data: the engine, fetcher, and db crates all
//! receive an [`AppConfig`] (or pieces of it) by value instead of reading
//! process-wide state.

use thiserror::Error;

mod app_config;
mod config;
#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

/// Weight applied to `title_sentiment * likes` in the combined score.
///
/// Tuned constant, paired with [`COMMENTS_WEIGHT`]: comments dominate the
/// weighted score and likes act as a minor tiebreaker.
pub const LIKES_WEIGHT: f64 = 0.012;

/// Weight applied to `avg_comment_sentiment * comment_count` in the
/// combined score.
pub const COMMENTS_WEIGHT: f64 = 0.988;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
