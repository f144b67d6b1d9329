//! The fetch orchestrator: per (brand, window, target-count) request,
//! produce a complete scored item set while minimizing external API cost.
//!
//! Flow per brand: cache coverage check → (if insufficient) partition the
//! window into page-sized sub-windows → bounded concurrent fetch + score →
//! join → persist → union with cached rows. Errors are contained at the
//! smallest unit that can safely be skipped: one item, or one sub-window.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use brandpulse_core::{COMMENTS_WEIGHT, LIKES_WEIGHT};
use brandpulse_db::CachedScoredItem;
use brandpulse_fetcher::{ContentItem, FetchError, Window};
use brandpulse_sentiment::SentimentError;

use crate::traits::{ContentSource, ScoreCache, Scorer};

/// Engagement-weighted combination of title and comment sentiment.
///
/// Comments dominate; likes act as a minor tiebreaker. The result is
/// deliberately unbounded — high-engagement items should outweigh
/// low-engagement ones in downstream aggregates.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weighted_sentiment(
    title_sentiment: f64,
    avg_comment_sentiment: f64,
    likes: i64,
    comment_count: i64,
) -> f64 {
    title_sentiment * likes as f64 * LIKES_WEIGHT
        + avg_comment_sentiment * comment_count as f64 * COMMENTS_WEIGHT
}

/// Why one fetched item produced no cache row.
#[derive(Debug)]
pub enum SkipReason {
    /// Zero or unknown comment count — no signal, explicitly excluded.
    NoComments,
    /// The source returned an item without a title; nothing to score.
    MissingTitle,
    CommentFetch(FetchError),
    /// Title scoring failed; persisting a fabricated title score is worse
    /// than dropping the item.
    TitleScoring(SentimentError),
    /// Comment scoring returned a corrupt response (wrong length or shape).
    /// Distinct from an unreachable scorer, which degrades to neutral.
    CommentScoring(SentimentError),
}

#[derive(Debug)]
pub struct SkippedItem {
    pub item_id: String,
    pub reason: SkipReason,
}

/// Everything one brand request produced: the full item set (cached plus
/// newly scored) and the ledger of items that were fetched but skipped.
#[derive(Debug)]
pub struct BrandDataReport {
    pub brand: String,
    pub items: Vec<CachedScoredItem>,
    pub skipped: Vec<SkippedItem>,
    /// `true` when cache coverage satisfied the request and no external
    /// call was made.
    pub served_from_cache: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Items per content API page; sub-windows are sized to fill one page.
    pub page_size: u32,
    /// Top-level comments fetched per item.
    pub comment_limit: u32,
    /// Cap on concurrently processed sub-windows.
    pub fetch_concurrency: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            comment_limit: 50,
            fetch_concurrency: 8,
        }
    }
}

pub struct Orchestrator {
    source: Arc<dyn ContentSource>,
    scorer: Arc<dyn Scorer>,
    cache: Arc<dyn ScoreCache>,
    settings: OrchestratorSettings,
}

#[derive(Default)]
struct SubwindowOutcome {
    items: Vec<CachedScoredItem>,
    skipped: Vec<SkippedItem>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        source: Arc<dyn ContentSource>,
        scorer: Arc<dyn Scorer>,
        cache: Arc<dyn ScoreCache>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            source,
            scorer,
            cache,
            settings,
        }
    }

    /// Produce the scored item set for one brand.
    ///
    /// If the cache already holds at least `target_count` rows for the
    /// window, they are returned unchanged and no fetch or scoring call is
    /// made. Otherwise the window is partitioned, fetched, scored, and the
    /// results persisted; the returned set is the union of cached and new
    /// rows, deduplicated by item id with the cached row winning.
    ///
    /// Never fails: fetch and scoring errors shrink the result, they do not
    /// abort it.
    pub async fn get_brand_data(
        &self,
        brand: &str,
        target_count: usize,
        window: &Window,
    ) -> BrandDataReport {
        let cached = self.cache.search(brand, window).await;
        if cached.len() >= target_count {
            tracing::info!(
                brand,
                cached = cached.len(),
                target_count,
                "cache covers request — no fetch"
            );
            return BrandDataReport {
                brand: brand.to_owned(),
                items: cached,
                skipped: Vec::new(),
                served_from_cache: true,
            };
        }

        tracing::info!(
            brand,
            cached = cached.len(),
            target_count,
            "cache insufficient — fetching"
        );

        let page_size = usize::try_from(self.settings.page_size).unwrap_or(50).max(1);
        let subwindow_count = target_count.div_ceil(page_size).max(1);
        let subwindows = window.split(subwindow_count);

        let outcomes: Vec<SubwindowOutcome> = stream::iter(subwindows)
            .map(|w| self.process_subwindow(brand, w))
            .buffer_unordered(self.settings.fetch_concurrency.max(1))
            .collect()
            .await;

        // Barrier: all fetch/score tasks have been joined; only now persist.
        let mut produced = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            produced.extend(outcome.items);
            skipped.extend(outcome.skipped);
        }

        for item in &produced {
            match self.cache.insert(item).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(item_id = %item.item_id, "item already cached");
                }
                Err(e) => {
                    tracing::warn!(item_id = %item.item_id, error = %e,
                        "cache insert failed — continuing with remaining items");
                }
            }
        }

        // Cached rows go first so the original record wins on duplicate ids.
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(cached.len() + produced.len());
        for item in cached.into_iter().chain(produced) {
            if seen.insert(item.item_id.clone()) {
                items.push(item);
            }
        }

        BrandDataReport {
            brand: brand.to_owned(),
            items,
            skipped,
            served_from_cache: false,
        }
    }

    /// Flat item set across several brands. A brand that yields nothing
    /// contributes nothing; the multi-brand request itself never fails.
    pub async fn get_all_data(
        &self,
        brands: &[String],
        target_count: usize,
        window: &Window,
    ) -> Vec<CachedScoredItem> {
        let mut all = Vec::new();
        for brand in brands {
            let report = self.get_brand_data(brand, target_count, window).await;
            tracing::info!(
                brand,
                items = report.items.len(),
                skipped = report.skipped.len(),
                from_cache = report.served_from_cache,
                "brand data ready"
            );
            all.extend(report.items);
        }
        all
    }

    /// Fetch and score one sub-window. A failed fetch empties this
    /// sub-window's contribution; it never affects siblings.
    async fn process_subwindow(&self, brand: &str, window: Window) -> SubwindowOutcome {
        let page_size = self.settings.page_size;
        let page = match self
            .source
            .fetch_window(brand, &window, page_size, page_size as usize)
            .await
        {
            Ok(page) => page,
            Err(e) if e.is_terminal() => {
                tracing::error!(brand, window = ?window, error = %e,
                    "terminal fetch error — dropping sub-window");
                return SubwindowOutcome::default();
            }
            Err(e) => {
                tracing::warn!(brand, window = ?window, error = %e,
                    "transient fetch error — dropping sub-window");
                return SubwindowOutcome::default();
            }
        };

        let mut outcome = SubwindowOutcome::default();
        for item in page.items {
            match self.process_item(item).await {
                Ok(row) => outcome.items.push(row),
                Err(skip) => {
                    tracing::debug!(item_id = %skip.item_id, reason = ?skip.reason, "skipping item");
                    outcome.skipped.push(skip);
                }
            }
        }
        outcome
    }

    /// Score one content item, or explain why it was skipped.
    async fn process_item(&self, item: ContentItem) -> Result<CachedScoredItem, SkippedItem> {
        fn skip(item_id: &str, reason: SkipReason) -> SkippedItem {
            SkippedItem {
                item_id: item_id.to_owned(),
                reason,
            }
        }

        if item.comment_count <= 0 {
            return Err(skip(&item.id, SkipReason::NoComments));
        }
        let Some(title) = item.title.clone() else {
            return Err(skip(&item.id, SkipReason::MissingTitle));
        };

        let comments = match self
            .source
            .top_comments(&item.id, self.settings.comment_limit)
            .await
        {
            Ok(comments) => comments,
            Err(e) => return Err(skip(&item.id, SkipReason::CommentFetch(e))),
        };
        if comments.is_empty() {
            return Err(skip(&item.id, SkipReason::NoComments));
        }

        let title_sentiment = match self
            .scorer
            .score(Some(&item.query), None, std::slice::from_ref(&title))
            .await
        {
            Ok(scores) if scores.len() == 1 => scores[0],
            Ok(scores) => {
                return Err(skip(
                    &item.id,
                    SkipReason::TitleScoring(SentimentError::LengthMismatch {
                        sent: 1,
                        got: scores.len(),
                    }),
                ))
            }
            Err(e) => return Err(skip(&item.id, SkipReason::TitleScoring(e))),
        };

        let avg_comment_sentiment = match self
            .scorer
            .score(Some(&item.query), Some(&title), &comments)
            .await
        {
            Ok(scores) if scores.len() == comments.len() => {
                #[allow(clippy::cast_precision_loss)]
                let denom = scores.len() as f64;
                scores.iter().sum::<f64>() / denom
            }
            Ok(scores) => {
                return Err(skip(
                    &item.id,
                    SkipReason::CommentScoring(SentimentError::LengthMismatch {
                        sent: comments.len(),
                        got: scores.len(),
                    }),
                ))
            }
            Err(
                e @ (SentimentError::LengthMismatch { .. }
                | SentimentError::MalformedResponse { .. }),
            ) => {
                return Err(skip(&item.id, SkipReason::CommentScoring(e)));
            }
            Err(e) => {
                // Scorer unreachable: neutral comments keep the item usable.
                tracing::warn!(item_id = %item.id, error = %e,
                    "comment scoring unavailable — defaulting to neutral");
                0.0
            }
        };

        let avg_sentiment = (title_sentiment + avg_comment_sentiment) / 2.0;
        let weighted = weighted_sentiment(
            title_sentiment,
            avg_comment_sentiment,
            item.likes,
            item.comment_count,
        );

        Ok(CachedScoredItem {
            item_id: item.id,
            query: item.query,
            channel: item.channel,
            published_at: item.published_at,
            title_sentiment,
            avg_comment_sentiment,
            avg_sentiment: Some(avg_sentiment),
            weighted_sentiment: Some(weighted),
            views: item.views,
            likes: item.likes,
            comment_count: item.comment_count,
        })
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
