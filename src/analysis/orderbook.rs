use serde::{Deserialize, Serialize};

use crate::cache::{now_ms, CacheStore};
use crate::config::{
    DEPTH_LEVELS, SPREAD_HISTORY_LEN, SPREAD_TIGHTEN_RATIO, SWEEP_DEPTH_RATIO, SWEEP_WINDOW_SECS,
};
use crate::error::Result;
use crate::types::{OrderBook, OrderBookLevel};

/// Spread history is read with a longer window than depth snapshots so the
/// rolling average survives gaps between polls.
const SPREAD_TTL_FACTOR: u64 = 10;

/// Last observed top-of-book depth per side, keyed by token in the cache.
/// This is the baseline the next poll's sweep check compares against.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DepthSnapshot {
    ts_ms: i64,
    depth_ask: f64,
    depth_bid: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BookMetrics {
    pub best_bid: f64,
    pub best_ask: f64,
    pub spread: f64,
    pub avg_spread: f64,
    pub spread_tightened: bool,
    pub ask_sweep: bool,
    pub bid_sweep: bool,
}

/// Compares each order-book snapshot against the cached previous one to
/// detect liquidity sweeps, and maintains a rolling spread history to detect
/// spread tightening.
///
/// Two concurrent analyses of the same token race on the cached baseline
/// (last writer wins). That can transiently skew one sweep verdict, which is
/// acceptable for a best-effort heuristic over distinct per-market tokens.
#[derive(Clone)]
pub struct OrderBookAnalyzer {
    cache: CacheStore,
    snapshot_ttl_secs: u64,
}

impl OrderBookAnalyzer {
    pub fn new(cache: CacheStore, snapshot_ttl_secs: u64) -> Self {
        Self {
            cache,
            snapshot_ttl_secs,
        }
    }

    pub async fn analyze(&self, token_id: &str, book: &OrderBook) -> Result<BookMetrics> {
        self.analyze_at(token_id, book, now_ms()).await
    }

    pub async fn analyze_at(
        &self,
        token_id: &str,
        book: &OrderBook,
        now_ms: i64,
    ) -> Result<BookMetrics> {
        let best_bid = first_price(&book.bids);
        let best_ask = first_price(&book.asks);
        let spread = if best_bid > 0.0 && best_ask > 0.0 {
            (best_ask - best_bid).abs()
        } else {
            0.0
        };

        let depth_ask = top_depth(&book.asks);
        let depth_bid = top_depth(&book.bids);

        // Sweep: depth collapsed below 45% of the prior snapshot within a
        // 120s window. Cold cache, stale prior or an empty prior side never
        // flags — a sweep is only ever inferred from a fresh baseline.
        let depth_key = format!("depth:{token_id}");
        let prev: Option<DepthSnapshot> = self
            .cache
            .get_at(&depth_key, self.snapshot_ttl_secs, now_ms)
            .await;

        let (ask_sweep, bid_sweep) = match &prev {
            Some(prev) if now_ms - prev.ts_ms < SWEEP_WINDOW_SECS * 1_000 => (
                prev.depth_ask > 0.0 && depth_ask / prev.depth_ask < SWEEP_DEPTH_RATIO,
                prev.depth_bid > 0.0 && depth_bid / prev.depth_bid < SWEEP_DEPTH_RATIO,
            ),
            _ => (false, false),
        };

        // The new snapshot becomes the baseline regardless of the verdict.
        self.cache
            .set_at(
                &depth_key,
                &DepthSnapshot {
                    ts_ms: now_ms,
                    depth_ask,
                    depth_bid,
                },
                now_ms,
            )
            .await?;

        // Rolling spread history: append, trim to the most recent 24, write
        // back, and average over the updated window.
        let spread_key = format!("spread:{token_id}");
        let mut history: Vec<f64> = self
            .cache
            .get_at(&spread_key, self.snapshot_ttl_secs * SPREAD_TTL_FACTOR, now_ms)
            .await
            .unwrap_or_default();
        history.push(spread);
        if history.len() > SPREAD_HISTORY_LEN {
            history.drain(..history.len() - SPREAD_HISTORY_LEN);
        }
        self.cache.set_at(&spread_key, &history, now_ms).await?;

        let avg_spread = history.iter().sum::<f64>() / history.len().max(1) as f64;
        let spread_tightened = avg_spread > 0.0 && spread < avg_spread * SPREAD_TIGHTEN_RATIO;

        Ok(BookMetrics {
            best_bid,
            best_ask,
            spread,
            avg_spread,
            spread_tightened,
            ask_sweep,
            bid_sweep,
        })
    }
}

fn first_price(levels: &[OrderBookLevel]) -> f64 {
    levels
        .first()
        .and_then(|l| l.price.parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

/// Sum of sizes over the first few levels — a top-of-book liquidity proxy.
fn top_depth(levels: &[OrderBookLevel]) -> f64 {
    levels
        .iter()
        .take(DEPTH_LEVELS)
        .filter_map(|l| l.size.parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn analyzer() -> OrderBookAnalyzer {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        let cache = CacheStore::new(pool);
        cache.init().await.expect("init cache table");
        OrderBookAnalyzer::new(cache, 240)
    }

    fn level(price: &str, size: &str) -> OrderBookLevel {
        OrderBookLevel {
            price: price.to_string(),
            size: size.to_string(),
        }
    }

    fn book(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> OrderBook {
        OrderBook {
            bids: bids.iter().map(|(p, s)| level(p, s)).collect(),
            asks: asks.iter().map(|(p, s)| level(p, s)).collect(),
        }
    }

    #[tokio::test]
    async fn cold_cache_never_flags_a_sweep() {
        let a = analyzer().await;
        let m = a
            .analyze_at("tok", &book(&[("0.40", "10")], &[("0.60", "10")]), 1_000_000)
            .await
            .unwrap();
        assert!(!m.ask_sweep);
        assert!(!m.bid_sweep);
        assert!((m.spread - 0.20).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fast_depth_collapse_flags_a_sweep() {
        let a = analyzer().await;
        let t = 1_000_000;

        // Baseline: 100 units of ask depth across the top 3 levels.
        a.analyze_at(
            "tok",
            &book(&[("0.40", "100")], &[("0.60", "50"), ("0.61", "30"), ("0.62", "20")]),
            t,
        )
        .await
        .unwrap();

        // 60s later ask depth is 40/100 < 45% — swept. Bid side held.
        let m = a
            .analyze_at(
                "tok",
                &book(&[("0.40", "100")], &[("0.60", "40")]),
                t + 60_000,
            )
            .await
            .unwrap();
        assert!(m.ask_sweep);
        assert!(!m.bid_sweep);
    }

    #[tokio::test]
    async fn stale_baseline_never_flags_a_sweep() {
        let a = analyzer().await;
        let t = 1_000_000;

        a.analyze_at("tok", &book(&[("0.40", "100")], &[("0.60", "100")]), t)
            .await
            .unwrap();

        // 130s later — outside the sweep window, regardless of the ratio.
        let m = a
            .analyze_at("tok", &book(&[("0.40", "5")], &[("0.60", "5")]), t + 130_000)
            .await
            .unwrap();
        assert!(!m.ask_sweep);
        assert!(!m.bid_sweep);
    }

    #[tokio::test]
    async fn zero_prior_depth_never_flags_a_sweep() {
        let a = analyzer().await;
        let t = 1_000_000;

        a.analyze_at("tok", &book(&[], &[]), t).await.unwrap();
        let m = a
            .analyze_at("tok", &book(&[], &[]), t + 10_000)
            .await
            .unwrap();
        assert!(!m.ask_sweep);
        assert!(!m.bid_sweep);
    }

    #[tokio::test]
    async fn spread_well_below_average_counts_as_tightened() {
        let a = analyzer().await;
        let t = 1_000_000;

        // Build a trailing history of wide 1.0 spreads.
        for i in 0..23i64 {
            a.analyze_at("tok", &book(&[("1.00", "10")], &[("2.00", "10")]), t + i * 1_000)
                .await
                .unwrap();
        }

        // 0.5 against a ~1.0 trailing average: tightened.
        let m = a
            .analyze_at("tok", &book(&[("1.00", "10")], &[("1.50", "10")]), t + 30_000)
            .await
            .unwrap();
        assert!(m.spread_tightened, "avg={}", m.avg_spread);

        // 0.7 against roughly the same average: not tightened.
        let m = a
            .analyze_at("tok", &book(&[("1.00", "10")], &[("1.70", "10")]), t + 31_000)
            .await
            .unwrap();
        assert!(!m.spread_tightened, "avg={}", m.avg_spread);
    }

    #[tokio::test]
    async fn spread_history_is_trimmed_to_24_entries() {
        let a = analyzer().await;
        let t = 1_000_000;

        for i in 0..30i64 {
            a.analyze_at("tok", &book(&[("0.40", "10")], &[("0.60", "10")]), t + i * 1_000)
                .await
                .unwrap();
        }

        let history: Vec<f64> = a.cache.get_at("spread:tok", 2_400, t + 30_000).await.unwrap();
        assert_eq!(history.len(), 24);
    }

    #[tokio::test]
    async fn one_sided_book_has_zero_spread() {
        let a = analyzer().await;
        let m = a
            .analyze_at("tok", &book(&[("0.40", "10")], &[]), 1_000_000)
            .await
            .unwrap();
        assert_eq!(m.spread, 0.0);
        assert_eq!(m.best_ask, 0.0);
        assert!((m.best_bid - 0.40).abs() < 1e-9);
    }
}
