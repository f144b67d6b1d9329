use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use brandpulse_db::{CachedScoredItem, DbError};
use brandpulse_fetcher::{ContentItem, ContentPage, FetchError, Window};
use brandpulse_sentiment::SentimentError;

use super::*;

// ---------------------------------------------------------------------------
// Mocks with call counters
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockSource {
    items: Vec<ContentItem>,
    /// Comment bodies per item id; ids missing here fail the comment fetch.
    comments: HashMap<String, Vec<String>>,
    fail_terminal: bool,
    search_calls: AtomicUsize,
    comment_calls: AtomicUsize,
}

#[async_trait]
impl ContentSource for MockSource {
    async fn fetch_window(
        &self,
        _query: &str,
        window: &Window,
        _page_size: u32,
        _max_items: usize,
    ) -> Result<ContentPage, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_terminal {
            return Err(FetchError::QuotaExhausted {
                url: "mock".to_owned(),
            });
        }
        let items = self
            .items
            .iter()
            .filter(|i| window.contains(i.published_at))
            .cloned()
            .collect();
        Ok(ContentPage {
            items,
            next_page_token: None,
        })
    }

    async fn top_comments(&self, item_id: &str, _limit: u32) -> Result<Vec<String>, FetchError> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        self.comments
            .get(item_id)
            .cloned()
            .ok_or(FetchError::UnexpectedStatus {
                status: 500,
                url: "mock".to_owned(),
            })
    }
}

#[derive(Clone, Copy)]
enum ScorerFailure {
    Unavailable,
    LengthMismatch,
}

#[derive(Default)]
struct MockScorer {
    /// Score per exact text; unknown texts score 0.0.
    per_text: HashMap<String, f64>,
    /// Any batch containing this text fails with the given failure.
    fail_on: Option<(String, ScorerFailure)>,
    calls: AtomicUsize,
}

#[async_trait]
impl Scorer for MockScorer {
    async fn score(
        &self,
        _brand: Option<&str>,
        _title: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<f64>, SentimentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((needle, failure)) = &self.fail_on {
            if texts.iter().any(|t| t == needle) {
                return Err(match failure {
                    ScorerFailure::Unavailable => SentimentError::UnexpectedStatus { status: 503 },
                    ScorerFailure::LengthMismatch => SentimentError::LengthMismatch {
                        sent: texts.len(),
                        got: 0,
                    },
                });
            }
        }
        Ok(texts
            .iter()
            .map(|t| self.per_text.get(t).copied().unwrap_or(0.0))
            .collect())
    }
}

#[derive(Default)]
struct MockCache {
    rows: Mutex<Vec<CachedScoredItem>>,
    search_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

#[async_trait]
impl ScoreCache for MockCache {
    async fn search(&self, query: &str, window: &Window) -> Vec<CachedScoredItem> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.query == query && window.contains(r.published_at))
            .cloned()
            .collect()
    }

    async fn insert(&self, item: &CachedScoredItem) -> Result<bool, DbError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.item_id == item.item_id) {
            return Ok(false);
        }
        rows.push(item.clone());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
}

fn window() -> Window {
    Window::new(ts(1, 1), ts(3, 1))
}

fn content_item(id: &str, title: Option<&str>, comment_count: i64, likes: i64) -> ContentItem {
    ContentItem {
        id: id.to_owned(),
        parent_id: None,
        query: "nike".to_owned(),
        title: title.map(str::to_owned),
        body: String::new(),
        published_at: ts(1, 15),
        channel: Some("SneakerTalk".to_owned()),
        views: 1000,
        likes,
        comment_count,
    }
}

fn cached_row(id: &str, avg_sentiment: f64) -> CachedScoredItem {
    CachedScoredItem {
        item_id: id.to_owned(),
        query: "nike".to_owned(),
        channel: None,
        published_at: ts(1, 10),
        title_sentiment: avg_sentiment,
        avg_comment_sentiment: avg_sentiment,
        avg_sentiment: Some(avg_sentiment),
        weighted_sentiment: None,
        views: 0,
        likes: 0,
        comment_count: 1,
    }
}

fn orchestrator(
    source: Arc<MockSource>,
    scorer: Arc<MockScorer>,
    cache: Arc<MockCache>,
) -> Orchestrator {
    Orchestrator::new(
        source,
        scorer,
        cache,
        OrchestratorSettings {
            page_size: 50,
            comment_limit: 20,
            fetch_concurrency: 2,
        },
    )
}

// ---------------------------------------------------------------------------
// Weighted sentiment formula
// ---------------------------------------------------------------------------

#[test]
fn weighted_sentiment_exact_arithmetic() {
    // 1.0 * 100 * 0.012 + (-1.0) * 10 * 0.988 = 1.2 - 9.88 = -8.68
    let result = weighted_sentiment(1.0, -1.0, 100, 10);
    assert!(
        (result - (-8.68)).abs() < 1e-12,
        "expected -8.68, got {result}"
    );
}

#[test]
fn weighted_sentiment_is_zero_for_zero_engagement() {
    assert_eq!(weighted_sentiment(0.9, -0.9, 0, 0), 0.0);
}

// ---------------------------------------------------------------------------
// Cache coverage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sufficient_cache_short_circuits_all_external_calls() {
    let source = Arc::new(MockSource::default());
    let scorer = Arc::new(MockScorer::default());
    let cache = Arc::new(MockCache::default());
    cache.rows.lock().unwrap().push(cached_row("p1", 0.5));
    cache.rows.lock().unwrap().push(cached_row("p2", -0.3));

    let orch = orchestrator(Arc::clone(&source), Arc::clone(&scorer), Arc::clone(&cache));
    let report = orch.get_brand_data("nike", 1, &window()).await;

    assert!(report.served_from_cache);
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].avg_sentiment, Some(0.5));
    assert_eq!(report.items[1].avg_sentiment, Some(-0.3));
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(source.comment_calls.load(Ordering::SeqCst), 0);
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn insufficient_cache_triggers_fetch() {
    let source = Arc::new(MockSource::default());
    let scorer = Arc::new(MockScorer::default());
    let cache = Arc::new(MockCache::default());
    cache.rows.lock().unwrap().push(cached_row("p1", 0.5));

    let orch = orchestrator(Arc::clone(&source), scorer, Arc::clone(&cache));
    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert!(!report.served_from_cache);
    // Cached row is still part of the result.
    assert_eq!(report.items.len(), 1);
    assert!(source.search_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn target_count_over_one_page_splits_into_subwindows() {
    let source = Arc::new(MockSource::default());
    let orch = orchestrator(
        Arc::clone(&source),
        Arc::new(MockScorer::default()),
        Arc::new(MockCache::default()),
    );

    // page_size 50, target 100 -> two sub-windows, one fetch each.
    orch.get_brand_data("nike", 100, &window()).await;
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Per-item processing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn item_is_scored_persisted_and_returned() {
    let mut source = MockSource {
        items: vec![content_item("v1", Some("nike air max review"), 2, 100)],
        ..MockSource::default()
    };
    source.comments.insert(
        "v1".to_owned(),
        vec!["love them".to_owned(), "sole fell off".to_owned()],
    );
    let mut scorer = MockScorer::default();
    scorer.per_text.insert("nike air max review".to_owned(), 0.6);
    scorer.per_text.insert("love them".to_owned(), 0.5);
    scorer.per_text.insert("sole fell off".to_owned(), -0.1);

    let source = Arc::new(source);
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(source, Arc::new(scorer), Arc::clone(&cache));

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert_eq!(report.items.len(), 1);
    assert!(report.skipped.is_empty());
    let row = &report.items[0];
    assert_eq!(row.item_id, "v1");
    assert_eq!(row.title_sentiment, 0.6);
    assert!((row.avg_comment_sentiment - 0.2).abs() < 1e-12);
    assert!((row.avg_sentiment.unwrap() - 0.4).abs() < 1e-12);
    let expected_weighted = weighted_sentiment(0.6, row.avg_comment_sentiment, 100, 2);
    assert!((row.weighted_sentiment.unwrap() - expected_weighted).abs() < 1e-12);

    // Persisted exactly once.
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn zero_comment_item_is_never_persisted() {
    let source = Arc::new(MockSource {
        items: vec![content_item("v1", Some("nike dunk"), 0, 10)],
        ..MockSource::default()
    });
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(source, Arc::new(MockScorer::default()), Arc::clone(&cache));

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert!(report.items.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].reason, SkipReason::NoComments));
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_title_skips_item() {
    let mut source = MockSource {
        items: vec![content_item("v1", None, 3, 10)],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["nice".to_owned()]);
    let orch = orchestrator(
        Arc::new(source),
        Arc::new(MockScorer::default()),
        Arc::new(MockCache::default()),
    );

    let report = orch.get_brand_data("nike", 5, &window()).await;
    assert!(report.items.is_empty());
    assert!(matches!(report.skipped[0].reason, SkipReason::MissingTitle));
}

#[tokio::test]
async fn comment_fetch_failure_skips_only_that_item() {
    // v1 has comments registered, v2 does not (comment fetch will fail).
    let mut source = MockSource {
        items: vec![
            content_item("v1", Some("nike pegasus"), 1, 5),
            content_item("v2", Some("nike blazer"), 4, 5),
        ],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["fast".to_owned()]);
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(
        Arc::new(source),
        Arc::new(MockScorer::default()),
        Arc::clone(&cache),
    );

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].item_id, "v1");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].item_id, "v2");
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::CommentFetch(_)
    ));
}

#[tokio::test]
async fn title_scoring_failure_skips_item() {
    let mut source = MockSource {
        items: vec![content_item("v1", Some("nike vaporfly"), 2, 5)],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["quick".to_owned()]);
    let scorer = MockScorer {
        fail_on: Some(("nike vaporfly".to_owned(), ScorerFailure::Unavailable)),
        ..MockScorer::default()
    };
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(Arc::new(source), Arc::new(scorer), Arc::clone(&cache));

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert!(report.items.is_empty());
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::TitleScoring(_)
    ));
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_comment_scoring_defaults_to_neutral() {
    let mut source = MockSource {
        items: vec![content_item("v1", Some("nike metcon"), 1, 50)],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["meh".to_owned()]);
    let mut scorer = MockScorer {
        fail_on: Some(("meh".to_owned(), ScorerFailure::Unavailable)),
        ..MockScorer::default()
    };
    scorer.per_text.insert("nike metcon".to_owned(), 0.8);
    let orch = orchestrator(
        Arc::new(source),
        Arc::new(scorer),
        Arc::new(MockCache::default()),
    );

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert_eq!(report.items.len(), 1);
    let row = &report.items[0];
    assert_eq!(row.avg_comment_sentiment, 0.0);
    // avg = (0.8 + 0.0) / 2
    assert!((row.avg_sentiment.unwrap() - 0.4).abs() < 1e-12);
}

#[tokio::test]
async fn comment_score_length_mismatch_skips_item() {
    let mut source = MockSource {
        items: vec![content_item("v1", Some("nike invincible"), 1, 5)],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["soft".to_owned()]);
    let scorer = MockScorer {
        fail_on: Some(("soft".to_owned(), ScorerFailure::LengthMismatch)),
        ..MockScorer::default()
    };
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(Arc::new(source), Arc::new(scorer), Arc::clone(&cache));

    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert!(report.items.is_empty());
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::CommentScoring(SentimentError::LengthMismatch { .. })
    ));
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Failure containment and dedup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn terminal_fetch_error_still_returns_cached_rows() {
    let source = Arc::new(MockSource {
        fail_terminal: true,
        ..MockSource::default()
    });
    let cache = Arc::new(MockCache::default());
    cache.rows.lock().unwrap().push(cached_row("p1", 0.5));

    let orch = orchestrator(source, Arc::new(MockScorer::default()), cache);
    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert!(!report.served_from_cache);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].item_id, "p1");
}

#[tokio::test]
async fn duplicate_ids_resolve_to_the_cached_row() {
    // The cache already holds v1 with avg 0.5; a refetch would produce 0.0.
    let mut source = MockSource {
        items: vec![content_item("v1", Some("nike free run"), 1, 5)],
        ..MockSource::default()
    };
    source
        .comments
        .insert("v1".to_owned(), vec!["ok".to_owned()]);
    let cache = Arc::new(MockCache::default());
    cache.rows.lock().unwrap().push(cached_row("v1", 0.5));

    let orch = orchestrator(
        Arc::new(source),
        Arc::new(MockScorer::default()),
        Arc::clone(&cache),
    );
    let report = orch.get_brand_data("nike", 5, &window()).await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].avg_sentiment, Some(0.5), "cached row must win");
    // The durable store kept the original values too.
    assert_eq!(cache.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn multi_brand_request_never_fails() {
    let source = Arc::new(MockSource {
        fail_terminal: true,
        ..MockSource::default()
    });
    let orch = orchestrator(
        source,
        Arc::new(MockScorer::default()),
        Arc::new(MockCache::default()),
    );

    let items = orch
        .get_all_data(
            &["nike".to_owned(), "adidas".to_owned()],
            5,
            &window(),
        )
        .await;

    assert!(items.is_empty(), "no data is a valid outcome, not an error");
}

// ---------------------------------------------------------------------------
// Full request-to-aggregate flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cached_brand_flows_into_distribution_unchanged() {
    let source = Arc::new(MockSource::default());
    let scorer = Arc::new(MockScorer::default());
    let cache = Arc::new(MockCache::default());
    cache.rows.lock().unwrap().push(cached_row("p1", 0.5));
    cache.rows.lock().unwrap().push(cached_row("p2", -0.3));

    let orch = orchestrator(Arc::clone(&source), Arc::clone(&scorer), cache);
    let report = orch.get_brand_data("nike", 1, &window()).await;

    assert!(report.served_from_cache);
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);

    let dist = crate::aggregate::distribution(&report.items, &["nike".to_owned()]);
    assert_eq!(dist["nike"], vec![0.5, -0.3]);
}

#[tokio::test]
async fn commentless_fetch_yields_placeholder_distribution() {
    let source = Arc::new(MockSource {
        items: vec![content_item("v1", Some("nike dunk"), 0, 10)],
        ..MockSource::default()
    });
    let cache = Arc::new(MockCache::default());
    let orch = orchestrator(source, Arc::new(MockScorer::default()), Arc::clone(&cache));

    let items = orch.get_all_data(&["nike".to_owned()], 5, &window()).await;

    assert!(items.is_empty());
    assert_eq!(cache.insert_calls.load(Ordering::SeqCst), 0);
    let dist = crate::aggregate::distribution(&items, &["nike".to_owned()]);
    assert_eq!(dist["nike"], vec![0.0, 0.0001]);
}
