// Aggregator: one composite response for a batch of symbols.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::engine::types::{DataSource, NewsFeed, Quote, Trending};
use crate::market_data::selector::SourceSelector;

/// Composite of quotes, trending and news. Top-level `source` is `api` as
/// soon as any constituent came from the api.
#[derive(Debug, Clone, Serialize)]
pub struct BulkResponse {
    pub quotes: BTreeMap<String, Quote>,
    pub trending: Trending,
    pub news: NewsFeed,
    /// Unix seconds.
    pub timestamp: i64,
    pub source: DataSource,
}

pub struct Aggregator {
    selector: Arc<SourceSelector>,
}

impl Aggregator {
    pub fn new(selector: Arc<SourceSelector>) -> Self {
        Self { selector }
    }

    /// One quote per requested symbol (each through its own cache key),
    /// trending and news exactly once per call. Never fails: a dead external
    /// path yields an entirely synthetic composite.
    #[instrument(skip(self))]
    pub async fn bulk(&self, symbols: &[String]) -> BulkResponse {
        let mut quotes = BTreeMap::new();
        for symbol in symbols {
            let quote = self.selector.get_quote(symbol).await;
            quotes.insert(quote.symbol.clone(), quote);
        }
        let trending = self.selector.get_trending().await;
        let news = self.selector.get_news().await;

        let any_api = quotes.values().any(|q| q.source == DataSource::Api)
            || trending.source == DataSource::Api
            || news.source == DataSource::Api;
        let source = if any_api {
            DataSource::Api
        } else {
            DataSource::EducationalFallback
        };
        info!(symbols = symbols.len(), %source, "assembled bulk response");

        BulkResponse {
            quotes,
            trending,
            news,
            timestamp: Utc::now().timestamp(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::walk::RandomWalkEngine;
    use crate::market_data::adapters::Offline;
    use crate::market_data::cache::FreshnessCache;

    fn offline_aggregator() -> Aggregator {
        let selector = Arc::new(SourceSelector::new(
            Arc::new(Offline),
            FreshnessCache::default(),
            RandomWalkEngine::new(),
        ));
        Aggregator::new(selector)
    }

    #[tokio::test]
    async fn bulk_returns_exactly_the_requested_symbols() {
        let aggregator = offline_aggregator();
        let symbols = vec!["TCS".to_string(), "INFY".to_string()];
        let response = aggregator.bulk(&symbols).await;

        assert_eq!(response.quotes.len(), 2);
        assert!(response.quotes.contains_key("TCS"));
        assert!(response.quotes.contains_key("INFY"));
        assert!(!response.news.items.is_empty());
        assert_eq!(
            response.trending.gainers.len() + response.trending.losers.len(),
            5
        );
    }

    #[tokio::test]
    async fn offline_bulk_is_tagged_as_fallback_top_to_bottom() {
        let aggregator = offline_aggregator();
        let response = aggregator.bulk(&["RELIANCE".to_string()]).await;
        assert_eq!(response.source, DataSource::EducationalFallback);
        for quote in response.quotes.values() {
            assert_eq!(quote.source, DataSource::EducationalFallback);
        }
    }

    #[tokio::test]
    async fn bulk_with_no_symbols_still_carries_trending_and_news() {
        let aggregator = offline_aggregator();
        let response = aggregator.bulk(&[]).await;
        assert!(response.quotes.is_empty());
        assert!(!response.news.items.is_empty());
        assert!(response.timestamp > 0);
    }
}
