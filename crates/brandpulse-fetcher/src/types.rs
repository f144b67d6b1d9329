//! Domain and wire types for the content search API.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// An inclusive timestamp range scoping a fetch or cache query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The last `days` days, ending now.
    #[must_use]
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Partition the window into `n` contiguous sub-windows of equal length.
    ///
    /// `n` is clamped to at least 1. Sub-windows cover the full range with no
    /// gaps; the last one ends exactly at `self.end` regardless of rounding.
    #[must_use]
    pub fn split(&self, n: usize) -> Vec<Window> {
        let n = n.max(1);
        let total = self.end - self.start;
        let step = total / i32::try_from(n).unwrap_or(i32::MAX);

        let mut windows = Vec::with_capacity(n);
        let mut cursor = self.start;
        for i in 0..n {
            let end = if i == n - 1 { self.end } else { cursor + step };
            windows.push(Window::new(cursor, end));
            cursor = end;
        }
        windows
    }
}

/// One post, comment, or video returned by the content API.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Source-assigned id, globally unique per item.
    pub id: String,
    /// Parent item id for comments/replies; `None` for top-level content.
    pub parent_id: Option<String>,
    /// The brand/query string this item was fetched for.
    pub query: String,
    pub title: Option<String>,
    pub body: String,
    pub published_at: DateTime<Utc>,
    /// Subreddit-or-channel tag, depending on source.
    pub channel: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub comment_count: i64,
}

/// One page of search results plus the continuation token, if any.
#[derive(Debug, Clone)]
pub struct ContentPage {
    pub items: Vec<ContentItem>,
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchItem {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub channel_title: Option<String>,
    #[serde(default)]
    pub statistics: Statistics,
}

/// Engagement counts; all optional on the wire, absent means zero.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Statistics {
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentsResponse {
    #[serde(default)]
    pub items: Vec<CommentItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub text: String,
}

impl SearchItem {
    pub(crate) fn into_content_item(self, query: &str) -> ContentItem {
        ContentItem {
            id: self.id,
            parent_id: None,
            query: query.to_owned(),
            title: self.title,
            body: self.description,
            published_at: self.published_at,
            channel: self.channel_title,
            views: self.statistics.view_count,
            likes: self.statistics.like_count,
            comment_count: self.statistics.comment_count,
        }
    }
}
