//! Order-flow screen: sweep and spread-tightening detection over both outcome
//! books of every market. Degraded rows carry an explicit status instead of
//! silently defaulting every flag.

use serde::Serialize;
use tracing::debug;

use crate::analysis::orderbook::BookMetrics;
use crate::analysis::signals::is_volume_spike;
use crate::config::{BOOK_CONCURRENCY, ORDERFLOW_MARKET_LIMIT};
use crate::engine::Engine;
use crate::error::Result;
use crate::mapper::map_bounded;
use crate::types::Market;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// Both outcome books fetched and analyzed.
    Analyzed,
    /// Market is missing a yes or no token id — nothing to analyze.
    InsufficientData,
    /// Book fetch failed for one side; flags default to false.
    BookUnavailable,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideMetrics {
    pub spread: f64,
    pub ask_sweep: bool,
    pub bid_sweep: bool,
}

impl From<&BookMetrics> for SideMetrics {
    fn from(m: &BookMetrics) -> Self {
        Self {
            spread: m.spread,
            ask_sweep: m.ask_sweep,
            bid_sweep: m.bid_sweep,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderflowRow {
    pub id: String,
    pub question: String,
    pub status: BookStatus,
    pub aggressive: bool,
    pub spread_tightened: bool,
    pub volume_spike: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes: Option<SideMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<SideMetrics>,
}

pub async fn run(engine: &Engine) -> Result<Vec<OrderflowRow>> {
    let markets = engine.client.fetch_markets(ORDERFLOW_MARKET_LIMIT).await?;

    let rows = map_bounded(markets, BOOK_CONCURRENCY, |market| {
        enrich(engine, market)
    })
    .await;

    Ok(rows)
}

async fn enrich(engine: &Engine, market: Market) -> OrderflowRow {
    let volume_spike = is_volume_spike(market.volume_24h);

    let (Some(yes_token), Some(no_token)) = (&market.yes_token_id, &market.no_token_id) else {
        return degraded(market, BookStatus::InsufficientData, volume_spike);
    };

    let books = tokio::try_join!(
        engine.client.fetch_order_book(yes_token),
        engine.client.fetch_order_book(no_token),
    );
    let (yes_book, no_book) = match books {
        Ok(pair) => pair,
        Err(e) => {
            debug!("order book fetch failed for {}: {e}", market.id);
            return degraded(market, BookStatus::BookUnavailable, volume_spike);
        }
    };

    // Analyzer failures are cache-write failures; treat them like a missing
    // book rather than poisoning the batch.
    let yes_metrics = engine.books.analyze(yes_token, &yes_book).await;
    let no_metrics = engine.books.analyze(no_token, &no_book).await;
    let (yes_metrics, no_metrics) = match (yes_metrics, no_metrics) {
        (Ok(y), Ok(n)) => (y, n),
        (y, n) => {
            if let Some(e) = y.err().or(n.err()) {
                debug!("book analysis failed for {}: {e}", market.id);
            }
            return degraded(market, BookStatus::BookUnavailable, volume_spike);
        }
    };

    let aggressive = yes_metrics.ask_sweep
        || yes_metrics.bid_sweep
        || no_metrics.ask_sweep
        || no_metrics.bid_sweep;
    let spread_tightened = yes_metrics.spread_tightened || no_metrics.spread_tightened;

    OrderflowRow {
        id: market.id,
        question: market.question,
        status: BookStatus::Analyzed,
        aggressive,
        spread_tightened,
        volume_spike,
        yes: Some(SideMetrics::from(&yes_metrics)),
        no: Some(SideMetrics::from(&no_metrics)),
    }
}

fn degraded(market: Market, status: BookStatus, volume_spike: bool) -> OrderflowRow {
    OrderflowRow {
        id: market.id,
        question: market.question,
        status,
        aggressive: false,
        spread_tightened: false,
        volume_spike,
        yes: None,
        no: None,
    }
}
