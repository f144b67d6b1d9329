//! Adapters wiring the real HTTP and Postgres clients into the engine's
//! service traits.

use async_trait::async_trait;
use sqlx::PgPool;

use brandpulse_db::{CachedScoredItem, DbError};
use brandpulse_fetcher::{ContentClient, ContentPage, FetchError, Window};
use brandpulse_sentiment::{SentimentClient, SentimentError};

use crate::traits::{ContentSource, ScoreCache, Scorer};

pub struct ApiContentSource {
    client: ContentClient,
}

impl ApiContentSource {
    #[must_use]
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for ApiContentSource {
    async fn fetch_window(
        &self,
        query: &str,
        window: &Window,
        page_size: u32,
        max_items: usize,
    ) -> Result<ContentPage, FetchError> {
        self.client
            .fetch_window(query, window, page_size, max_items)
            .await
    }

    async fn top_comments(&self, item_id: &str, limit: u32) -> Result<Vec<String>, FetchError> {
        self.client.top_comments(item_id, limit).await
    }
}

pub struct RpcScorer {
    client: SentimentClient,
}

impl RpcScorer {
    #[must_use]
    pub fn new(client: SentimentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Scorer for RpcScorer {
    async fn score(
        &self,
        brand: Option<&str>,
        title: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<f64>, SentimentError> {
        self.client.score(brand, title, texts).await
    }
}

pub struct PgScoreCache {
    pool: PgPool,
}

impl PgScoreCache {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreCache for PgScoreCache {
    /// Fail-open range query: a cache outage reads as an empty cache. The
    /// orchestrator then fetches everything, which is safe (idempotent
    /// inserts) but costs redundant external calls.
    async fn search(&self, query: &str, window: &Window) -> Vec<CachedScoredItem> {
        match brandpulse_db::search_cached_items(&self.pool, query, window.start, window.end).await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(query, error = %e, "cache search failed — treating as empty");
                Vec::new()
            }
        }
    }

    async fn insert(&self, item: &CachedScoredItem) -> Result<bool, DbError> {
        brandpulse_db::insert_cached_item(&self.pool, item).await
    }
}
