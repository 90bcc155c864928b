//! Pure signal predicates shared by the screen composers. Keeping the gates
//! as standalone functions keeps the conditional-fetch logic of the screens
//! (trades only on large moves) testable without any I/O.

use crate::config::{
    FRESH_WALLET_WINDOW_MS, SENTIMENT_NEUTRAL_BAND, VOLUME_SPIKE_THRESHOLD,
};
use crate::types::{SentimentResult, WalletFreshness};

/// Gate for the expensive insider lookups: only markets that already moved
/// are worth a trade fetch.
pub fn is_large_move(change_pct: f64, threshold: f64) -> bool {
    change_pct.abs() >= threshold
}

/// A large price move with little news attention and no real polarity —
/// somebody may know something the feeds don't.
pub fn is_silent_move(
    change_pct: f64,
    threshold: f64,
    sentiment: &SentimentResult,
    low_mentions: u32,
) -> bool {
    is_large_move(change_pct, threshold)
        && sentiment.mentions <= low_mentions
        && sentiment.score.abs() < SENTIMENT_NEUTRAL_BAND
}

/// Inverse-liquidity score in [0, 1] favoring overlooked markets, rounded to
/// two decimals. Zero liquidity scores zero — an empty market is not niche,
/// it is dead.
pub fn niche_score(liquidity: f64, cap: f64) -> f64 {
    if liquidity <= 0.0 || cap <= 0.0 {
        return 0.0;
    }
    let score = (1.0 - liquidity / cap).max(0.0);
    (score * 100.0).round() / 100.0
}

pub fn is_volume_spike(volume_24h: f64) -> bool {
    volume_24h > VOLUME_SPIKE_THRESHOLD
}

/// Markets named after heavily-arbed tickers are priced efficiently and are
/// poor hunting ground for overlooked signals.
pub fn is_high_efficiency(question: &str, keywords: &[String]) -> bool {
    let lower = question.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

/// Map a wallet's first-seen timestamp to the explicit tri-state. A failed or
/// unconfigured lookup stays `Unknown` so the front end can distinguish
/// "verified old" from "couldn't check".
pub fn wallet_freshness(first_seen_ms: Option<i64>, now_ms: i64) -> WalletFreshness {
    match first_seen_ms {
        Some(ts) if now_ms - ts < FRESH_WALLET_WINDOW_MS => WalletFreshness::Fresh,
        Some(_) => WalletFreshness::Stale,
        None => WalletFreshness::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_move_is_symmetric() {
        assert!(is_large_move(0.15, 0.10));
        assert!(is_large_move(-0.15, 0.10));
        assert!(is_large_move(0.10, 0.10));
        assert!(!is_large_move(0.09, 0.10));
    }

    #[test]
    fn silent_move_needs_move_plus_quiet_news() {
        let quiet = SentimentResult {
            mentions: 1,
            score: 0.05,
            keywords: vec![],
        };
        assert!(is_silent_move(0.15, 0.10, &quiet, 2));

        // Too many mentions.
        let loud = SentimentResult { mentions: 3, ..quiet.clone() };
        assert!(!is_silent_move(0.15, 0.10, &loud, 2));

        // Real polarity.
        let polarized = SentimentResult { score: 0.2, ..quiet.clone() };
        assert!(!is_silent_move(0.15, 0.10, &polarized, 2));

        // No move.
        assert!(!is_silent_move(0.05, 0.10, &quiet, 2));
    }

    #[test]
    fn niche_score_edges() {
        assert_eq!(niche_score(0.0, 75_000.0), 0.0);
        assert_eq!(niche_score(-5.0, 75_000.0), 0.0);
        assert_eq!(niche_score(75_000.0, 75_000.0), 0.0);
        assert_eq!(niche_score(150_000.0, 75_000.0), 0.0);
        assert_eq!(niche_score(37_500.0, 75_000.0), 0.5);
        // Rounded to two decimals.
        assert_eq!(niche_score(25_000.0, 75_000.0), 0.67);
    }

    #[test]
    fn volume_spike_threshold() {
        assert!(!is_volume_spike(25_000.0));
        assert!(is_volume_spike(25_000.01));
    }

    #[test]
    fn efficiency_matches_configured_tickers() {
        let kw = vec!["btc".to_string(), "nvidia".to_string()];
        assert!(is_high_efficiency("Will BTC close above 100k?", &kw));
        assert!(is_high_efficiency("Nvidia earnings beat?", &kw));
        assert!(!is_high_efficiency("Who wins the election?", &kw));
    }

    #[test]
    fn freshness_tri_state() {
        let now = 1_000_000_000_000;
        let hour = 3_600_000;
        assert_eq!(wallet_freshness(Some(now - hour), now), WalletFreshness::Fresh);
        assert_eq!(
            wallet_freshness(Some(now - 49 * hour), now),
            WalletFreshness::Stale
        );
        assert_eq!(wallet_freshness(None, now), WalletFreshness::Unknown);
    }
}
