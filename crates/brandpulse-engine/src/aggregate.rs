//! Chart-ready aggregates over scored items: per-brand sentiment
//! distributions and bucketed time series.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use brandpulse_db::CachedScoredItem;

/// Sentinel distribution for a brand with no usable scores. Two near-equal
/// points keep density plots well-defined where a single value (or none)
/// would degenerate.
const EMPTY_DISTRIBUTION: [f64; 2] = [0.0, 0.0001];

/// Time-series bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Day,
    Month,
}

impl Bucket {
    /// Truncate a timestamp to the start of its bucket.
    fn floor(self, at: DateTime<Utc>) -> DateTime<Utc> {
        let (y, m, d) = match self {
            Self::Day => (at.year(), at.month(), at.day()),
            Self::Month => (at.year(), at.month(), 1),
        };
        // The truncated calendar date of a valid timestamp is itself valid.
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or(at)
    }
}

/// Per-brand average-sentiment samples, clipped to [-1, 1].
///
/// Every requested brand appears in the result; a brand whose items carry no
/// signal (no items, or all scores exactly zero) maps to the
/// [`EMPTY_DISTRIBUTION`] placeholder instead of an empty vector.
#[must_use]
pub fn distribution(
    items: &[CachedScoredItem],
    brands: &[String],
) -> BTreeMap<String, Vec<f64>> {
    let mut out = BTreeMap::new();
    for brand in brands {
        let scores: Vec<f64> = items
            .iter()
            .filter(|i| &i.query == brand)
            .map(|i| i.avg_sentiment.unwrap_or(0.0).clamp(-1.0, 1.0))
            .collect();
        let scores = if scores.is_empty() || scores.iter().all(|s| *s == 0.0) {
            EMPTY_DISTRIBUTION.to_vec()
        } else {
            scores
        };
        out.insert(brand.clone(), scores);
    }
    out
}

/// Per-brand mean sentiment over time, one point per non-empty bucket.
///
/// Points are chronological; buckets with no items are omitted rather than
/// emitted as zero, so a quiet month reads as a gap, not as neutral
/// sentiment. Brands with no items map to an empty series.
#[must_use]
pub fn series(
    items: &[CachedScoredItem],
    brands: &[String],
    bucket: Bucket,
) -> BTreeMap<String, Vec<(DateTime<Utc>, f64)>> {
    let mut out = BTreeMap::new();
    for brand in brands {
        let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
        for item in items.iter().filter(|i| &i.query == brand) {
            let score = item.avg_sentiment.unwrap_or(0.0).clamp(-1.0, 1.0);
            buckets
                .entry(bucket.floor(item.published_at))
                .or_default()
                .push(score);
        }
        let points = buckets
            .into_iter()
            .map(|(start, scores)| {
                #[allow(clippy::cast_precision_loss)]
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                (start, mean)
            })
            .collect();
        out.insert(brand.clone(), points);
    }
    out
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
