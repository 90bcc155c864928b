use crate::error::{AppError, Result};

pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";
pub const DATA_API_URL: &str = "https://data-api.polymarket.com";
pub const POLYGONSCAN_API_URL: &str = "https://api.polygonscan.com/api";

/// Number of levels per side summed into the top-of-book depth proxy.
pub const DEPTH_LEVELS: usize = 3;

/// A depth snapshot older than this is ignored by sweep detection — depth
/// that drained over several minutes is repricing, not aggression.
pub const SWEEP_WINDOW_SECS: i64 = 120;

/// Current depth below this fraction of the prior snapshot flags a sweep.
pub const SWEEP_DEPTH_RATIO: f64 = 0.45;

/// Rolling spread history length per token.
pub const SPREAD_HISTORY_LEN: usize = 24;

/// Spread below this fraction of its trailing average counts as tightened.
pub const SPREAD_TIGHTEN_RATIO: f64 = 0.6;

/// 24h volume above this absolute level counts as a spike.
pub const VOLUME_SPIKE_THRESHOLD: f64 = 25_000.0;

/// A wallet whose first on-chain activity is within this window is fresh.
pub const FRESH_WALLET_WINDOW_MS: i64 = 48 * 3_600 * 1_000;

/// Minimum notional a fresh top buyer must have moved to fire the signal.
pub const WHALE_NOTIONAL_USD: f64 = 10_000.0;

/// Sentiment scores inside this band are treated as no real polarity.
pub const SENTIMENT_NEUTRAL_BAND: f64 = 0.12;

/// Price points kept in the recent-window sparkline.
pub const RECENT_PRICE_WINDOW: usize = 24;

/// In-flight enrichment caps per screen.
pub const ENRICH_CONCURRENCY: usize = 6;
pub const BOOK_CONCURRENCY: usize = 5;
pub const BUYER_CONCURRENCY: usize = 3;

pub const TOP_BUYERS: usize = 3;
pub const TRADES_FETCH_LIMIT: usize = 50;
pub const ORDERFLOW_MARKET_LIMIT: usize = 60;

/// News items older than this are dropped from the sentiment corpus.
pub const NEWS_MAX_AGE_MS: i64 = 24 * 3_600 * 1_000;

const DEFAULT_RSS_FEEDS: &[&str] = &[
    "https://rss.nytimes.com/services/xml/rss/nyt/Politics.xml",
    "https://feeds.a.dj.com/rss/RSSMarketsMain.xml",
    "https://feeds.reuters.com/Reuters/PoliticsNews",
    "https://feeds.reuters.com/news/world",
    "https://www.politico.com/rss/politics08.xml",
    "https://www.wsj.com/xml/rss/3_7031.xml",
];

const DEFAULT_POLITICS_TAGS: &[&str] = &[
    "politics", "elections", "government", "policy", "white house", "congress",
];

const DEFAULT_FINANCE_TAGS: &[&str] =
    &["finance", "macro", "markets", "economy", "rates", "fed"];

const DEFAULT_HIGH_EFFICIENCY_KEYWORDS: &[&str] = &[
    "btc", "bitcoin", "eth", "ethereum", "sol", "solana", "xrp", "bnb", "doge",
    "aapl", "apple", "msft", "microsoft", "googl", "google", "amzn", "amazon",
    "nvda", "nvidia", "meta", "tesla", "tsla",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub gamma_api_url: String,
    pub clob_api_url: String,
    pub data_api_url: String,
    pub polygonscan_api_url: String,
    /// Wallet-age lookups resolve to Unknown when absent (POLYGONSCAN_API_KEY).
    pub polygonscan_api_key: Option<String>,
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Markets pulled per poll from Gamma (MAX_MARKETS).
    pub max_markets: usize,
    /// Minimum |hourly change| for a market to qualify as a mover (VELOCITY_THRESHOLD).
    pub velocity_threshold: f64,
    /// Base freshness window for cached snapshots, seconds (CACHE_TTL_SECONDS).
    pub cache_ttl_secs: u64,
    /// Liquidity at or above this scores zero niche interest (LIQUIDITY_NICHE_MAX).
    pub niche_liquidity_cap: f64,
    /// Mention counts at or below this count as low news attention (SENTIMENT_MENTIONS_LOW).
    pub low_mentions_threshold: u32,
    /// Per-request timeout for every upstream call (HTTP_TIMEOUT_SECONDS).
    pub http_timeout_secs: u64,
    pub rss_feeds: Vec<String>,
    pub politics_tags: Vec<String>,
    pub finance_tags: Vec<String>,
    pub high_efficiency_keywords: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            gamma_api_url: std::env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| GAMMA_API_URL.to_string()),
            clob_api_url: std::env::var("CLOB_API_URL")
                .unwrap_or_else(|_| CLOB_API_URL.to_string()),
            data_api_url: std::env::var("DATA_API_URL")
                .unwrap_or_else(|_| DATA_API_URL.to_string()),
            polygonscan_api_url: std::env::var("POLYGONSCAN_API_URL")
                .unwrap_or_else(|_| POLYGONSCAN_API_URL.to_string()),
            polygonscan_api_key: std::env::var("POLYGONSCAN_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH")
                .unwrap_or_else(|_| "polymarket-alpha.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| {
                    AppError::Config("API_PORT must be a valid port number".to_string())
                })?,
            max_markets: std::env::var("MAX_MARKETS")
                .unwrap_or_else(|_| "100".to_string())
                .parse::<usize>()
                .unwrap_or(100),
            velocity_threshold: std::env::var("VELOCITY_THRESHOLD")
                .unwrap_or_else(|_| "0.1".to_string())
                .parse::<f64>()
                .unwrap_or(0.1),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "240".to_string())
                .parse::<u64>()
                .unwrap_or(240),
            niche_liquidity_cap: std::env::var("LIQUIDITY_NICHE_MAX")
                .unwrap_or_else(|_| "75000".to_string())
                .parse::<f64>()
                .unwrap_or(75_000.0),
            low_mentions_threshold: std::env::var("SENTIMENT_MENTIONS_LOW")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u32>()
                .unwrap_or(2),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .unwrap_or(15),
            rss_feeds: env_list("RSS_FEEDS", DEFAULT_RSS_FEEDS, false),
            politics_tags: env_list("POLITICS_TAGS", DEFAULT_POLITICS_TAGS, true),
            finance_tags: env_list("FINANCE_TAGS", DEFAULT_FINANCE_TAGS, true),
            high_efficiency_keywords: env_list(
                "HIGH_EFFICIENCY_KEYWORDS",
                DEFAULT_HIGH_EFFICIENCY_KEYWORDS,
                true,
            ),
        })
    }
}

/// Comma-separated env var, falling back to the built-in default list.
fn env_list(var: &str, default: &[&str], lowercase: bool) -> Vec<String> {
    let parsed: Vec<String> = std::env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| if lowercase { s.to_lowercase() } else { s.to_string() })
                .collect()
        })
        .unwrap_or_default();

    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}
