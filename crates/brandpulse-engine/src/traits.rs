//! Service seams for the orchestrator's collaborators.

use async_trait::async_trait;

use brandpulse_db::{CachedScoredItem, DbError};
use brandpulse_fetcher::{ContentPage, FetchError, Window};
use brandpulse_sentiment::SentimentError;

/// Paginated, rate-limited source of content items for a query and window.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch up to `max_items` items for one sub-window, following
    /// continuation tokens internally.
    async fn fetch_window(
        &self,
        query: &str,
        window: &Window,
        page_size: u32,
        max_items: usize,
    ) -> Result<ContentPage, FetchError>;

    /// Top-level comment bodies for one content item.
    async fn top_comments(&self, item_id: &str, limit: u32) -> Result<Vec<String>, FetchError>;
}

/// Text batch in, one float in [-1, 1] per text out, order-preserving.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        brand: Option<&str>,
        title: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<f64>, SentimentError>;
}

/// Durable cache of scored items.
///
/// `search` is fail-open: an unavailable cache reads as empty, which makes
/// the orchestrator fetch everything — safe because inserts are idempotent,
/// at the price of redundant external calls.
#[async_trait]
pub trait ScoreCache: Send + Sync {
    async fn search(&self, query: &str, window: &Window) -> Vec<CachedScoredItem>;

    /// Idempotent insert keyed by `item_id`; returns whether a row was
    /// actually written.
    async fn insert(&self, item: &CachedScoredItem) -> Result<bool, DbError>;
}
