use tracing::warn;

use crate::analysis::orderbook::OrderBookAnalyzer;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::MarketClient;
use crate::news::NewsFetcher;
use crate::types::PricePoint;

/// Shared handle bundling the upstream client, the durable cache and the
/// stateful analyzers. Built once at startup and injected into every screen —
/// no ambient singletons.
#[derive(Clone)]
pub struct Engine {
    pub cfg: Config,
    pub client: MarketClient,
    pub cache: CacheStore,
    pub news: NewsFetcher,
    pub books: OrderBookAnalyzer,
}

impl Engine {
    pub fn new(cfg: Config, cache: CacheStore) -> Result<Self> {
        let client = MarketClient::new(&cfg)?;
        let news = NewsFetcher::new(&cfg, cache.clone())?;
        let books = OrderBookAnalyzer::new(cache.clone(), cfg.cache_ttl_secs);
        Ok(Self {
            cfg,
            client,
            cache,
            news,
            books,
        })
    }

    /// Price history for a token, cached under the base TTL. Fails soft to an
    /// empty series — one token's flaky history must not sink its market, the
    /// velocity analyzer simply reports no change.
    pub async fn price_history(&self, token_id: &str) -> Vec<PricePoint> {
        let cache_key = format!("history:{token_id}");
        if let Some(history) = self
            .cache
            .get::<Vec<PricePoint>>(&cache_key, self.cfg.cache_ttl_secs)
            .await
        {
            return history;
        }

        match self.client.fetch_price_history(token_id).await {
            Ok(history) => {
                if let Err(e) = self.cache.set(&cache_key, &history).await {
                    warn!("failed to cache price history for {token_id}: {e}");
                }
                history
            }
            Err(e) => {
                warn!("price history fetch failed for {token_id}: {e}");
                Vec::new()
            }
        }
    }
}
