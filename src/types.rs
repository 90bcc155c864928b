use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Canonical market record, rebuilt from the raw Gamma payload on every poll.
/// Never persisted — the cache only holds derived analyzer state.
#[derive(Debug, Clone, Serialize)]
pub struct Market {
    pub id: String,
    pub question: String,
    /// Lowercased, order-preserving dedup of category/subcategory/tags.
    pub tags: Vec<String>,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub yes_token_id: Option<String>,
    pub no_token_id: Option<String>,
    pub yes_price: f64,
    pub no_price: f64,
}

// ---------------------------------------------------------------------------
// Price history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch timestamp as delivered by the CLOB `t` field.
    pub ts: i64,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Order book
// ---------------------------------------------------------------------------

/// CLOB book levels carry prices and sizes as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderBookLevel {
    pub price: String,
    pub size: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub bids: Vec<OrderBookLevel>,
    #[serde(default)]
    pub asks: Vec<OrderBookLevel>,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// A trade reduced to what the insider screen needs: who, and how much USD.
#[derive(Debug, Clone)]
pub struct Trade {
    pub address: String,
    pub usd: f64,
}

/// First-seen wallet age, resolved against the chain ledger.
/// `Unknown` is a real outcome (lookup unavailable), never coerced to Stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletFreshness {
    Fresh,
    Stale,
    Unknown,
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Publish time in epoch millis; None when the feed gave no parsable date.
    pub published_ms: Option<i64>,
    /// Item description / snippet.
    pub summary: Option<String>,
    /// Full content body when the feed provides one.
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SentimentResult {
    pub mentions: u32,
    /// Mean per-item polarity over mentioning items, in [-1, 1].
    pub score: f64,
    /// Up to 6 topic keywords extracted from the market question.
    pub keywords: Vec<String>,
}
