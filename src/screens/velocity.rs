//! Velocity screen: markets whose price just moved hard, flagged as "silent"
//! when the news corpus barely mentions them.

use serde::Serialize;

use crate::analysis::sentiment;
use crate::analysis::signals::{is_large_move, is_silent_move};
use crate::analysis::velocity::compute_change;
use crate::config::ENRICH_CONCURRENCY;
use crate::engine::Engine;
use crate::error::Result;
use crate::mapper::map_bounded;
use crate::types::{Market, NewsItem, SentimentResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityRow {
    pub id: String,
    pub question: String,
    pub tags: Vec<String>,
    pub yes_price: f64,
    pub no_price: f64,
    pub change_pct: f64,
    pub last_24h: Vec<f64>,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub sentiment: SentimentResult,
    pub silent_move: bool,
    pub yes_token_id: Option<String>,
    pub no_token_id: Option<String>,
}

/// Does the market belong to a watched category? Matches needles against its
/// tags or, failing that, the question text itself — Gamma tagging is spotty.
pub fn matches_category(tags: &[String], question: &str, needles: &[String]) -> bool {
    let lower = question.to_lowercase();
    tags.iter()
        .any(|tag| needles.iter().any(|n| tag.contains(n.as_str())))
        || needles.iter().any(|n| lower.contains(n.as_str()))
}

pub async fn run(engine: &Engine) -> Result<Vec<VelocityRow>> {
    let markets = engine.client.fetch_markets(engine.cfg.max_markets).await?;
    let news = engine.news.recent_items().await;

    let watched: Vec<Market> = markets
        .into_iter()
        .filter(|m| {
            matches_category(&m.tags, &m.question, &engine.cfg.politics_tags)
                || matches_category(&m.tags, &m.question, &engine.cfg.finance_tags)
        })
        .collect();

    let mut rows = map_bounded(watched, ENRICH_CONCURRENCY, |market| {
        enrich(engine, &news, market)
    })
    .await;

    rows.retain(|row| is_large_move(row.change_pct, engine.cfg.velocity_threshold));
    rows.sort_by(|a, b| {
        b.change_pct
            .abs()
            .partial_cmp(&a.change_pct.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(rows)
}

async fn enrich(engine: &Engine, news: &[NewsItem], market: Market) -> VelocityRow {
    let history = match &market.yes_token_id {
        Some(token) => engine.price_history(token).await,
        None => Vec::new(),
    };
    let change = compute_change(&history);

    let sentiment = sentiment::score_market(&market.question, news);
    let silent_move = is_silent_move(
        change.change_pct,
        engine.cfg.velocity_threshold,
        &sentiment,
        engine.cfg.low_mentions_threshold,
    );

    // Gamma occasionally omits outcome prices; the last history point is the
    // next best estimate of where yes trades.
    let yes_price = if market.yes_price > 0.0 {
        market.yes_price
    } else {
        history.last().map(|p| p.price).unwrap_or(0.0)
    };

    VelocityRow {
        id: market.id,
        question: market.question,
        tags: market.tags,
        yes_price,
        no_price: market.no_price,
        change_pct: change.change_pct,
        last_24h: change.recent,
        liquidity: market.liquidity,
        volume_24h: market.volume_24h,
        sentiment,
        silent_move,
        yes_token_id: market.yes_token_id,
        no_token_id: market.no_token_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn category_matches_on_tags() {
        let needles = tags(&["politics", "elections"]);
        assert!(matches_category(&tags(&["us-politics"]), "Anything", &needles));
        assert!(!matches_category(&tags(&["sports"]), "Big game tonight", &needles));
    }

    #[test]
    fn category_falls_back_to_question_text() {
        let needles = tags(&["congress"]);
        assert!(matches_category(&[], "Will Congress pass the bill?", &needles));
    }
}
