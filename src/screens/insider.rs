//! Insider screen: niche markets ranked by inverse liquidity, with top-buyer
//! wallet freshness resolved only for markets that already moved — the trade
//! and ledger lookups are the most expensive calls in the system.

use std::collections::HashMap;

use serde::Serialize;

use crate::analysis::signals::{is_high_efficiency, is_large_move, niche_score, wallet_freshness};
use crate::analysis::velocity::compute_change;
use crate::cache::now_ms;
use crate::config::{BUYER_CONCURRENCY, ENRICH_CONCURRENCY, TOP_BUYERS, WHALE_NOTIONAL_USD};
use crate::engine::Engine;
use crate::error::Result;
use crate::mapper::map_bounded;
use crate::types::{Market, Trade, WalletFreshness};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBuyer {
    pub address: String,
    pub usd: f64,
    pub freshness: WalletFreshness,
    pub first_seen_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsiderRow {
    pub id: String,
    pub question: String,
    pub tags: Vec<String>,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub efficiency: bool,
    pub niche_score: f64,
    pub large_move: bool,
    pub top_buyers: Vec<TopBuyer>,
    pub fresh_signal: bool,
}

/// Aggregate trade notional per address and keep the heaviest buyers.
pub fn top_buyers_by_notional(trades: &[Trade], limit: usize) -> Vec<(String, f64)> {
    let mut by_address: HashMap<&str, f64> = HashMap::new();
    for trade in trades {
        *by_address.entry(trade.address.as_str()).or_default() += trade.usd;
    }

    let mut ranked: Vec<(String, f64)> = by_address
        .into_iter()
        .map(|(addr, usd)| (addr.to_string(), usd))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

pub async fn run(engine: &Engine) -> Result<Vec<InsiderRow>> {
    let markets = engine.client.fetch_markets(engine.cfg.max_markets).await?;

    let mut rows = map_bounded(markets, ENRICH_CONCURRENCY, |market| {
        enrich(engine, market)
    })
    .await;

    rows.retain(|row| row.liquidity <= engine.cfg.niche_liquidity_cap);
    rows.sort_by(|a, b| {
        b.niche_score
            .partial_cmp(&a.niche_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(rows)
}

async fn enrich(engine: &Engine, market: Market) -> InsiderRow {
    let history = match &market.yes_token_id {
        Some(token) => engine.price_history(token).await,
        None => Vec::new(),
    };
    let change = compute_change(&history);
    let large_move = is_large_move(change.change_pct, engine.cfg.velocity_threshold);

    // Cost gate: trades (and the ledger lookups behind them) only for markets
    // that already moved.
    let trades = if large_move {
        engine.client.fetch_trades(&market.id).await
    } else {
        Vec::new()
    };

    let ranked = top_buyers_by_notional(&trades, TOP_BUYERS);
    let now = now_ms();
    let top_buyers = map_bounded(ranked, BUYER_CONCURRENCY, |(address, usd)| async move {
        let first_seen_ms = engine.client.first_seen_ms(&address).await;
        TopBuyer {
            freshness: wallet_freshness(first_seen_ms, now),
            address,
            usd,
            first_seen_ms,
        }
    })
    .await;

    let fresh_signal = top_buyers
        .iter()
        .any(|b| b.freshness == WalletFreshness::Fresh && b.usd > WHALE_NOTIONAL_USD);

    InsiderRow {
        efficiency: is_high_efficiency(&market.question, &engine.cfg.high_efficiency_keywords),
        niche_score: niche_score(market.liquidity, engine.cfg.niche_liquidity_cap),
        id: market.id,
        question: market.question,
        tags: market.tags,
        liquidity: market.liquidity,
        volume_24h: market.volume_24h,
        large_move,
        top_buyers,
        fresh_signal,
    }
}
