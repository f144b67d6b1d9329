//! Rate-limited, paginated client for the external content search API.
//!
//! Produces [`ContentItem`]s (posts/videos plus engagement counts) for a
//! query and time window. Every outbound request passes through the shared
//! [`RateLimiter`] first; errors are typed so callers can tell transient
//! network failures from terminal auth/quota rejections.

pub mod client;
pub mod error;
pub mod rate_limit;
pub mod types;

pub use client::ContentClient;
pub use error::FetchError;
pub use rate_limit::RateLimiter;
pub use types::{ContentItem, ContentPage, Window};
