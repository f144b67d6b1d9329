use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use brandpulse_core::AppConfig;
use brandpulse_engine::{
    distribution, series, ApiContentSource, Bucket, Orchestrator, OrchestratorSettings,
    PgScoreCache, RpcScorer, SkipReason,
};
use brandpulse_fetcher::{ContentClient, RateLimiter, Window};
use brandpulse_sentiment::SentimentClient;

#[derive(Debug, Parser)]
#[command(name = "brandpulse")]
#[command(about = "Brand sentiment cache and aggregation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, score, and cache content for one brand.
    Fetch {
        #[arg(long)]
        brand: String,
        /// Minimum number of scored items the result should hold.
        #[arg(long, default_value_t = 50)]
        target: usize,
        /// Lookback in days; defaults to the configured lookback.
        #[arg(long)]
        days: Option<i64>,
    },
    /// Per-brand sentiment distribution, printed as JSON.
    Distribution {
        #[arg(long, value_delimiter = ',', required = true)]
        brands: Vec<String>,
        #[arg(long, default_value_t = 50)]
        target: usize,
        #[arg(long)]
        days: Option<i64>,
    },
    /// Per-brand sentiment time series, printed as JSON.
    Series {
        #[arg(long, value_delimiter = ',', required = true)]
        brands: Vec<String>,
        #[arg(long, value_enum, default_value_t = BucketArg::Month)]
        bucket: BucketArg,
        #[arg(long, default_value_t = 50)]
        target: usize,
        #[arg(long)]
        days: Option<i64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BucketArg {
    Day,
    Month,
}

impl From<BucketArg> for Bucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Day => Bucket::Day,
            BucketArg::Month => Bucket::Month,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = brandpulse_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let pool = brandpulse_db::connect_pool(
        &config.database_url,
        brandpulse_db::PoolConfig {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        },
    )
    .await?;
    brandpulse_db::run_migrations(&pool).await?;

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_millis(config.rate_limit_window_ms),
    ));
    let content = ContentClient::new(
        &config.content_api_url,
        &config.content_api_key,
        config.request_timeout_secs,
        limiter,
    )?;
    let sentiment = SentimentClient::new(&config.sentiment_url, config.request_timeout_secs)?;

    let orchestrator = Orchestrator::new(
        Arc::new(ApiContentSource::new(content)),
        Arc::new(RpcScorer::new(sentiment)),
        Arc::new(PgScoreCache::new(pool)),
        OrchestratorSettings {
            page_size: config.page_size,
            fetch_concurrency: config.fetch_concurrency,
            ..OrchestratorSettings::default()
        },
    );

    match cli.command {
        Commands::Fetch {
            brand,
            target,
            days,
        } => {
            let window = lookback_window(&config, days);
            let report = orchestrator.get_brand_data(&brand, target, &window).await;
            println!(
                "{}: {} scored items ({} skipped, served from cache: {})",
                report.brand,
                report.items.len(),
                report.skipped.len(),
                report.served_from_cache
            );
            for skipped in &report.skipped {
                let reason = match &skipped.reason {
                    SkipReason::NoComments => "no comments".to_owned(),
                    SkipReason::MissingTitle => "missing title".to_owned(),
                    SkipReason::CommentFetch(e) => format!("comment fetch failed: {e}"),
                    SkipReason::TitleScoring(e) => format!("title scoring failed: {e}"),
                    SkipReason::CommentScoring(e) => format!("comment scoring failed: {e}"),
                };
                println!("  skipped {}: {reason}", skipped.item_id);
            }
        }
        Commands::Distribution {
            brands,
            target,
            days,
        } => {
            let window = lookback_window(&config, days);
            let items = orchestrator.get_all_data(&brands, target, &window).await;
            let dist = distribution(&items, &brands);
            println!("{}", serde_json::to_string_pretty(&dist)?);
        }
        Commands::Series {
            brands,
            bucket,
            target,
            days,
        } => {
            let window = lookback_window(&config, days);
            let items = orchestrator.get_all_data(&brands, target, &window).await;
            let points = series(&items, &brands, bucket.into());
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
    }

    Ok(())
}

/// Lookback window for a request, never reaching past the cache retention
/// horizon.
fn lookback_window(config: &AppConfig, days: Option<i64>) -> Window {
    let days = days
        .unwrap_or(config.lookback_days)
        .min(config.cache_retention_days)
        .max(1);
    Window::last_days(days)
}
