//! Database operations for the `content_cache` table.
//!
//! Rows are write-once: sentiment scores must not drift after they were
//! computed, so inserts are `ON CONFLICT DO NOTHING` — a duplicate insert is
//! a no-op, never an overwrite. Rows are never deleted; staleness is bounded
//! by the caller's retention window, not by eviction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A scored content item as persisted in `content_cache`.
///
/// `item_id` is the source API's globally unique id and the primary key.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CachedScoredItem {
    pub item_id: String,
    /// The brand/query string the item was fetched for.
    pub query: String,
    /// Subreddit-or-channel tag, depending on source.
    pub channel: Option<String>,
    pub published_at: DateTime<Utc>,
    pub title_sentiment: f64,
    pub avg_comment_sentiment: f64,
    /// Mean of title and comment sentiment; null until computed.
    pub avg_sentiment: Option<f64>,
    /// Engagement-weighted combination; unbounded, unlike the raw scores.
    pub weighted_sentiment: Option<f64>,
    pub views: i64,
    pub likes: i64,
    pub comment_count: i64,
}

/// Insert a scored item, ignoring duplicates.
///
/// Returns `true` if a row was written, `false` if the `item_id` already
/// existed (in which case the new values are discarded).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails. A failure for one item is
/// expected to be logged by the caller and must not abort its loop.
pub async fn insert_cached_item(pool: &PgPool, item: &CachedScoredItem) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO content_cache \
             (item_id, query, channel, published_at, title_sentiment, \
              avg_comment_sentiment, avg_sentiment, weighted_sentiment, \
              views, likes, comment_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (item_id) DO NOTHING",
    )
    .bind(&item.item_id)
    .bind(&item.query)
    .bind(&item.channel)
    .bind(item.published_at)
    .bind(item.title_sentiment)
    .bind(item.avg_comment_sentiment)
    .bind(item.avg_sentiment)
    .bind(item.weighted_sentiment)
    .bind(item.views)
    .bind(item.likes)
    .bind(item.comment_count)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// All cached items for `query` with `published_at` in `[start, end]`,
/// oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails. Callers that prefer
/// fail-open semantics (treat an unavailable cache as empty) handle that
/// at their own layer.
pub async fn search_cached_items(
    pool: &PgPool,
    query: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<CachedScoredItem>, DbError> {
    let rows = sqlx::query_as::<_, CachedScoredItem>(
        "SELECT item_id, query, channel, published_at, title_sentiment, \
                avg_comment_sentiment, avg_sentiment, weighted_sentiment, \
                views, likes, comment_count \
         FROM content_cache \
         WHERE query = $1 \
           AND published_at >= $2 \
           AND published_at <= $3 \
         ORDER BY published_at ASC, item_id ASC",
    )
    .bind(query)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
