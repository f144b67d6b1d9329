//! HTTP client for the content search API.
//!
//! Keyword-search endpoint with `publishedAfter`/`publishedBefore` window
//! parameters and `pageToken` continuation. The API over-matches: results
//! whose title does not actually contain the query string (case-insensitive)
//! are discarded here before anything downstream sees them.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::FetchError;
use crate::rate_limit::RateLimiter;
use crate::types::{CommentsResponse, ContentPage, SearchResponse, Window};

/// Maximum pages followed within one sub-window fetch. Guards against
/// cycling continuation tokens.
pub(crate) const MAX_PAGES: usize = 50;

pub struct ContentClient {
    client: Client,
    base_url: String,
    api_key: String,
    limiter: Arc<RateLimiter>,
}

impl ContentClient {
    /// Creates a client with the given timeout. Every request acquires a
    /// slot from `limiter` before going out.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`FetchError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, FetchError> {
        reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            limiter,
        })
    }

    /// Fetches one page of search results for `query` within `window`.
    ///
    /// Items whose title does not contain `query` (case-insensitive) are
    /// dropped from the returned page; the continuation token is passed
    /// through untouched.
    ///
    /// # Errors
    ///
    /// - [`FetchError::AuthRejected`] — HTTP 401/403 (terminal).
    /// - [`FetchError::QuotaExhausted`] — HTTP 429 (terminal).
    /// - [`FetchError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`FetchError::Http`] — network or timeout failure (transient).
    /// - [`FetchError::Deserialize`] — response body is not the search schema.
    pub async fn search_page(
        &self,
        query: &str,
        window: &Window,
        limit: u32,
        page_token: Option<&str>,
    ) -> Result<ContentPage, FetchError> {
        let url = self.search_url(query, window, limit, page_token)?;
        let endpoint = format!("{}/search", self.base_url);

        self.limiter.acquire().await;
        let response = self.client.get(url).send().await?;
        let body = Self::check_status(response, &endpoint).await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Deserialize {
                context: format!("search response for \"{query}\""),
                source,
            })?;

        let total = parsed.items.len();
        let needle = query.to_lowercase();
        let items: Vec<_> = parsed
            .items
            .into_iter()
            .filter(|item| {
                item.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .map(|item| item.into_content_item(query))
            .collect();

        if items.len() < total {
            tracing::debug!(
                query,
                dropped = total - items.len(),
                "discarded over-matched results without the brand in the title"
            );
        }

        Ok(ContentPage {
            items,
            next_page_token: parsed.next_page_token,
        })
    }

    /// Fetches up to `max_items` results for one sub-window, following
    /// continuation tokens across pages.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::search_page`]. Returns
    /// [`FetchError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn fetch_window(
        &self,
        query: &str,
        window: &Window,
        page_size: u32,
        max_items: usize,
    ) -> Result<ContentPage, FetchError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(FetchError::PaginationLimit {
                    query: query.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let page = self
                .search_page(query, window, page_size, token.as_deref())
                .await?;
            items.extend(page.items);
            token = page.next_page_token;

            if token.is_none() || items.len() >= max_items {
                break;
            }
        }

        Ok(ContentPage {
            items,
            next_page_token: token,
        })
    }

    /// Fetches the top-level comment bodies for one content item.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search_page`].
    pub async fn top_comments(
        &self,
        item_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, FetchError> {
        let endpoint = format!("{}/comments", self.base_url);
        let mut url = reqwest::Url::parse(&endpoint).map_err(|e| FetchError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("itemId", item_id)
            .append_pair("maxResults", &limit.to_string())
            .append_pair("key", &self.api_key);

        self.limiter.acquire().await;
        let response = self.client.get(url).send().await?;
        let body = Self::check_status(response, &endpoint).await?;

        let parsed: CommentsResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Deserialize {
                context: format!("comments response for item {item_id}"),
                source,
            })?;

        Ok(parsed.items.into_iter().map(|c| c.text).collect())
    }

    /// Maps a non-2xx response to a typed error; returns the body on success.
    ///
    /// `endpoint` (without query string) is used in errors so the API key
    /// never ends up in logs.
    async fn check_status(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<String, FetchError> {
        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(response.text().await?),
            401 | 403 => Err(FetchError::AuthRejected {
                status: status.as_u16(),
                url: endpoint.to_owned(),
            }),
            429 => Err(FetchError::QuotaExhausted {
                url: endpoint.to_owned(),
            }),
            _ => Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_owned(),
            }),
        }
    }

    pub(crate) fn search_url(
        &self,
        query: &str,
        window: &Window,
        limit: u32,
        page_token: Option<&str>,
    ) -> Result<reqwest::Url, FetchError> {
        let endpoint = format!("{}/search", self.base_url);
        let mut url = reqwest::Url::parse(&endpoint).map_err(|e| FetchError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("maxResults", &limit.to_string())
            .append_pair("publishedAfter", &window.start.to_rfc3339())
            .append_pair("publishedBefore", &window.end.to_rfc3339());
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        url.query_pairs_mut().append_pair("key", &self.api_key);

        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
