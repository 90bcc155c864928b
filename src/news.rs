use std::time::Duration;

use chrono::DateTime;
use tracing::{debug, warn};

use crate::cache::{now_ms, CacheStore};
use crate::config::{Config, NEWS_MAX_AGE_MS};
use crate::error::Result;
use crate::mapper::map_bounded;
use crate::types::NewsItem;

const FEED_CONCURRENCY: usize = 4;

/// Per-feed TTL multiplier — headlines age slower than order books.
const FEED_TTL_FACTOR: u64 = 5;

/// Pulls the configured RSS feeds into one corpus of recent items.
/// Each feed is cached and isolated: a broken feed is skipped with a warning,
/// never failing the batch.
#[derive(Clone)]
pub struct NewsFetcher {
    http: reqwest::Client,
    cache: CacheStore,
    feeds: Vec<String>,
    feed_ttl_secs: u64,
}

impl NewsFetcher {
    pub fn new(cfg: &Config, cache: CacheStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            cache,
            feeds: cfg.rss_feeds.clone(),
            feed_ttl_secs: cfg.cache_ttl_secs * FEED_TTL_FACTOR,
        })
    }

    /// Items from all feeds, no older than 24 hours. Items without a parsable
    /// publish date are kept — dropping them would silently blind the
    /// sentiment scorer to feeds with nonstandard dates.
    pub async fn recent_items(&self) -> Vec<NewsItem> {
        let now = now_ms();
        let batches = map_bounded(self.feeds.clone(), FEED_CONCURRENCY, |url| async move {
            match self.fetch_feed(&url).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("RSS feed failed, skipping {url}: {e}");
                    Vec::new()
                }
            }
        })
        .await;

        batches
            .into_iter()
            .flatten()
            .filter(|item| match item.published_ms {
                Some(ts) => now - ts < NEWS_MAX_AGE_MS,
                None => true,
            })
            .collect()
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<NewsItem>> {
        let cache_key = format!("rss:{url}");
        if let Some(items) = self.cache.get::<Vec<NewsItem>>(&cache_key, self.feed_ttl_secs).await {
            debug!("RSS cache hit for {url} ({} items)", items.len());
            return Ok(items);
        }

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let channel = rss::Channel::read_from(&bytes[..])
            .map_err(|e| crate::error::AppError::Upstream(format!("RSS parse: {e}")))?;

        let items: Vec<NewsItem> = channel
            .items()
            .iter()
            .map(|item| NewsItem {
                title: item.title().map(|s| s.to_string()),
                link: item.link().map(|s| s.to_string()),
                published_ms: item.pub_date().and_then(parse_pub_date),
                summary: item.description().map(|s| s.to_string()),
                body: item.content().map(|s| s.to_string()),
            })
            .collect();

        self.cache.set(&cache_key, &items).await?;
        Ok(items)
    }
}

/// RSS dates are RFC 2822 by spec, but some feeds emit RFC 3339.
fn parse_pub_date(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc2822_and_rfc3339_dates() {
        let rfc2822 = parse_pub_date("Tue, 01 Jul 2025 10:00:00 GMT");
        assert!(rfc2822.is_some());

        let rfc3339 = parse_pub_date("2025-07-01T10:00:00Z");
        assert_eq!(rfc2822, rfc3339);
    }

    #[test]
    fn garbage_date_is_none() {
        assert_eq!(parse_pub_date("sometime last week"), None);
    }
}
