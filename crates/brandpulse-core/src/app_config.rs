/// Runtime configuration for the BrandPulse pipeline.
///
/// Built once at startup from environment variables (see
/// [`crate::load_app_config`]) and passed down to the crates that need it.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    /// Base URL of the content search API (e.g. `https://content.example.com/v3`).
    pub content_api_url: String,
    /// API key appended to every content API request.
    pub content_api_key: String,
    /// URL of the sentiment scoring RPC endpoint.
    pub sentiment_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Items requested per content API page; sub-windows are sized so one
    /// sub-window fills roughly one page.
    pub page_size: u32,
    /// Maximum content API requests per rolling rate-limit window.
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_ms: u64,
    /// Cap on concurrent sub-window fetch/score tasks per request.
    pub fetch_concurrency: usize,
    /// Default lookback for CLI queries, in days.
    pub lookback_days: i64,
    /// Cached rows older than this are ignored by coverage checks.
    /// Rows are never deleted; retention only bounds what a query trusts.
    pub cache_retention_days: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("content_api_url", &self.content_api_url)
            .field("content_api_key", &"[redacted]")
            .field("sentiment_url", &self.sentiment_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_ms", &self.rate_limit_window_ms)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("lookback_days", &self.lookback_days)
            .field("cache_retention_days", &self.cache_retention_days)
            .finish()
    }
}
