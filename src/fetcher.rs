use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, TRADES_FETCH_LIMIT};
use crate::error::{AppError, Result};
use crate::normalize::{parse_market, parse_trades};
use crate::types::{Market, OrderBook, PricePoint, Trade};

/// HTTP client for every upstream the engine consumes: Gamma (market list),
/// CLOB (price history, order books), the data API (trades) and Polygonscan
/// (wallet age). All requests share one hard timeout — a hung upstream must
/// not stall an enrichment slot indefinitely.
#[derive(Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    gamma_url: String,
    clob_url: String,
    data_url: String,
    polygonscan_url: String,
    polygonscan_key: Option<String>,
}

impl MarketClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            gamma_url: cfg.gamma_api_url.clone(),
            clob_url: cfg.clob_api_url.clone(),
            data_url: cfg.data_api_url.clone(),
            polygonscan_url: cfg.polygonscan_api_url.clone(),
            polygonscan_key: cfg.polygonscan_api_key.clone(),
        })
    }

    /// Active markets from Gamma, normalized. The response is usually a bare
    /// array but some deployments wrap it in `{markets: [...]}`.
    pub async fn fetch_markets(&self, limit: usize) -> Result<Vec<Market>> {
        let url = format!(
            "{}/markets?active=true&closed=false&limit={}",
            self.gamma_url, limit
        );
        let resp: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = resp
            .as_array()
            .cloned()
            .or_else(|| resp.get("markets").and_then(|m| m.as_array()).cloned())
            .ok_or_else(|| {
                AppError::Upstream("Gamma /markets response was not an array".to_string())
            })?;

        debug!("fetched {} raw markets from Gamma", items.len());
        Ok(items.iter().map(parse_market).collect())
    }

    /// Hourly price history for a token from the CLOB.
    pub async fn fetch_price_history(&self, token_id: &str) -> Result<Vec<PricePoint>> {
        let url = format!(
            "{}/prices-history?market={}&interval=1d&fidelity=60",
            self.clob_url, token_id
        );
        let resp: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let history = resp
            .get("history")
            .and_then(|h| h.as_array())
            .map(|points| {
                points
                    .iter()
                    .filter_map(|p| {
                        let ts = p.get("t")?.as_i64()?;
                        let price = p.get("p")?.as_f64()?;
                        Some(PricePoint { ts, price })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(history)
    }

    pub async fn fetch_order_book(&self, token_id: &str) -> Result<OrderBook> {
        let url = format!("{}/book?token_id={}", self.clob_url, token_id);
        let book = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(book)
    }

    /// Recent trades for a market, reduced to `(address, usd)` rows.
    /// Fails soft: the insider screen treats trade data as best-effort.
    pub async fn fetch_trades(&self, market_id: &str) -> Vec<Trade> {
        let url = format!(
            "{}/trades?market={}&limit={}",
            self.data_url, market_id, TRADES_FETCH_LIMIT
        );

        let resp: Value = match self.fetch_json(&url).await {
            Ok(v) => v,
            Err(e) => {
                warn!("trade fetch failed for {market_id}: {e}");
                return Vec::new();
            }
        };

        let raw = resp
            .as_array()
            .cloned()
            .or_else(|| resp.get("trades").and_then(|t| t.as_array()).cloned())
            .unwrap_or_default();

        parse_trades(&raw)
    }

    /// First on-chain transaction time for an address, in epoch millis.
    /// `None` covers both "no API key configured" and any lookup failure —
    /// the caller maps it to an explicit Unknown, never to "not fresh".
    pub async fn first_seen_ms(&self, address: &str) -> Option<i64> {
        let key = self.polygonscan_key.as_deref()?;
        let url = format!(
            "{}?module=account&action=txlist&address={}&page=1&offset=1&sort=asc&apikey={}",
            self.polygonscan_url, address, key
        );

        let resp: Value = match self.fetch_json(&url).await {
            Ok(v) => v,
            Err(e) => {
                debug!("wallet age lookup failed for {address}: {e}");
                return None;
            }
        };

        let secs = resp
            .get("result")?
            .as_array()?
            .first()?
            .get("timeStamp")?
            .as_str()?
            .parse::<i64>()
            .ok()?;
        Some(secs * 1_000)
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }
}
