// Source selector: external api first, synthetic fallback always ready.
// No public operation here ever fails the caller; every degradation is
// logged and tagged via DataSource instead.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::engine::types::{Candle, DataSource, History, Mover, NewsFeed, NewsItem, Quote, Trending};
use crate::engine::walk::RandomWalkEngine;
use crate::instruments;
use crate::market_data::adapters::{endpoints, MarketDataSource};
use crate::market_data::cache::FreshnessCache;
use crate::market_data::normaliser;

/// At most this many rows are taken from api trending/news payloads.
const MAX_API_ROWS: usize = 10;
/// Movers per side in a trending response.
const MOVERS_PER_SIDE: usize = 5;

pub struct SourceSelector {
    source: Arc<dyn MarketDataSource>,
    cache: FreshnessCache,
    engine: RandomWalkEngine,
}

impl SourceSelector {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        cache: FreshnessCache,
        engine: RandomWalkEngine,
    ) -> Self {
        Self { source, cache, engine }
    }

    pub fn engine(&self) -> &RandomWalkEngine {
        &self.engine
    }

    /// Quote for one symbol: api payload if it yields a numeric price,
    /// synthetic otherwise.
    #[instrument(skip(self))]
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        let symbol = symbol.to_uppercase();
        let params = vec![("name".to_string(), symbol.clone())];
        if let Some(payload) = self
            .cache
            .fetch(&*self.source, endpoints::STOCK, &params)
            .await
        {
            if let Some(quote) = quote_from_payload(&symbol, &payload) {
                return quote;
            }
            debug!(%symbol, "quote payload had no recognizable price");
        }
        metrics::counter!("mdx_fallback_total", "kind" => "quote").increment(1);
        self.engine.quote(&symbol)
    }

    /// Candle history: api payload if it yields a non-empty candle list,
    /// random-walk series otherwise.
    #[instrument(skip(self))]
    pub async fn get_history(&self, symbol: &str, period: &str) -> History {
        let symbol = symbol.to_uppercase();
        let params = vec![
            ("stock_name".to_string(), symbol.clone()),
            ("period".to_string(), api_period(period).to_string()),
            ("filter".to_string(), "default".to_string()),
        ];
        if let Some(payload) = self
            .cache
            .fetch(&*self.source, endpoints::HISTORICAL, &params)
            .await
        {
            if let Some(rows) = normaliser::rows(&payload) {
                let mut candles: Vec<Candle> =
                    rows.iter().filter_map(normaliser::candle).collect();
                if !candles.is_empty() {
                    candles.sort_by_key(|c| c.time);
                    return History {
                        symbol,
                        period: period.to_string(),
                        candles,
                        source: DataSource::Api,
                    };
                }
            }
            debug!(%symbol, period, "history payload had no usable candles");
        }
        metrics::counter!("mdx_fallback_total", "kind" => "history").increment(1);
        History {
            candles: self.engine.historical_series(&symbol, period, None),
            symbol,
            period: period.to_string(),
            source: DataSource::EducationalFallback,
        }
    }

    /// Standalone chart view. Always synthetic; the intraday generator is the
    /// educational product, not a degraded api response.
    pub fn get_chart(&self, symbol: &str, period: &str) -> History {
        let symbol = symbol.to_uppercase();
        History {
            candles: self.engine.intraday_series(&symbol, period),
            symbol,
            period: period.to_string(),
            source: DataSource::EducationalFallback,
        }
    }

    /// Top movers: api rows split into gainers/losers, or synthetic movers
    /// derived from the reference instruments.
    #[instrument(skip(self))]
    pub async fn get_trending(&self) -> Trending {
        if let Some(payload) = self
            .cache
            .fetch(&*self.source, endpoints::TRENDING, &[])
            .await
        {
            if let Some(rows) = normaliser::rows(&payload) {
                let movers: Vec<Mover> = rows
                    .iter()
                    .take(MAX_API_ROWS)
                    .filter_map(normaliser::mover)
                    .collect();
                if !movers.is_empty() {
                    return split_movers(movers, DataSource::Api);
                }
            }
            debug!("trending payload had no usable rows");
        }
        metrics::counter!("mdx_fallback_total", "kind" => "trending").increment(1);
        self.fallback_trending()
    }

    /// Market news: api items or the educational samples.
    #[instrument(skip(self))]
    pub async fn get_news(&self) -> NewsFeed {
        if let Some(payload) = self.cache.fetch(&*self.source, endpoints::NEWS, &[]).await {
            if let Some(rows) = normaliser::rows(&payload) {
                let items: Vec<NewsItem> = rows
                    .iter()
                    .take(MAX_API_ROWS)
                    .filter_map(normaliser::news_item)
                    .collect();
                if !items.is_empty() {
                    return NewsFeed { items, source: DataSource::Api };
                }
            }
            debug!("news payload had no usable items");
        }
        metrics::counter!("mdx_fallback_total", "kind" => "news").increment(1);
        fallback_news()
    }

    fn fallback_trending(&self) -> Trending {
        let mut rng = rand::thread_rng();
        let movers = instruments::TRENDING_SYMBOLS
            .iter()
            .map(|symbol| {
                let quote = self.engine.quote(symbol);
                Mover {
                    symbol: quote.symbol,
                    price: quote.price,
                    // Spread the synthetic movers across both sides.
                    change_percent: round2(rng.gen_range(-5.0..5.0)),
                    volume: quote.volume,
                }
            })
            .collect();
        split_movers(movers, DataSource::EducationalFallback)
    }
}

/// Quote from a raw payload. Only the price is mandatory; every other field
/// is taken from the payload when present and derived from the price when
/// not, so the caller always sees the complete shape.
fn quote_from_payload(symbol: &str, payload: &Value) -> Option<Quote> {
    let price = round2(normaliser::price(payload)?);
    let change_percent = normaliser::change_percent(payload).unwrap_or(0.0);
    let mut rng = rand::thread_rng();

    let field = |key: &str| normaliser::number(payload, &[key]);
    let open_jitter = Normal::new(0.0, 0.005)
        .map(|n| n.sample(&mut rng))
        .unwrap_or(0.0);
    let (name, sector, market_cap) = match instruments::lookup(symbol) {
        Some(i) => (i.name.to_string(), i.sector.to_string(), i.market_cap.to_string()),
        None => (format!("{symbol} Ltd"), "Unknown".to_string(), "N/A".to_string()),
    };

    Some(Quote {
        symbol: symbol.to_string(),
        price,
        change: round2(price * change_percent / 100.0),
        change_percent: round2(change_percent),
        volume: payload
            .get("volume")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| rng.gen_range(10_000..=1_000_000)),
        high: field("high").unwrap_or(price * 1.02),
        low: field("low").unwrap_or(price * 0.98),
        open: field("open").unwrap_or(price * (1.0 + open_jitter)),
        prev_close: field("prev_close").unwrap_or(price),
        name,
        sector,
        market_cap,
        source: DataSource::Api,
        timestamp: Utc::now().timestamp(),
    })
}

fn split_movers(movers: Vec<Mover>, source: DataSource) -> Trending {
    let (mut gainers, mut losers): (Vec<Mover>, Vec<Mover>) =
        movers.into_iter().partition(|m| m.change_percent > 0.0);
    gainers.sort_by(|a, b| cmp_f64(b.change_percent, a.change_percent));
    losers.sort_by(|a, b| cmp_f64(a.change_percent, b.change_percent));
    gainers.truncate(MOVERS_PER_SIDE);
    losers.truncate(MOVERS_PER_SIDE);
    Trending { gainers, losers, source }
}

fn fallback_news() -> NewsFeed {
    let now = Utc::now();
    NewsFeed {
        items: vec![
            NewsItem {
                title: "Market Update: Indices show mixed signals".to_string(),
                summary: "Educational content: Markets demonstrate daily volatility patterns"
                    .to_string(),
                timestamp: now.to_rfc3339(),
                source: "Educational Sample".to_string(),
            },
            NewsItem {
                title: "Sector Analysis: Technology stocks in focus".to_string(),
                summary: "Learning module: Understanding sector rotation concepts".to_string(),
                timestamp: (now - ChronoDuration::hours(2)).to_rfc3339(),
                source: "Educational Sample".to_string(),
            },
        ],
        source: DataSource::EducationalFallback,
    }
}

/// Provider period names differ from ours.
fn api_period(period: &str) -> &'static str {
    match period {
        "3m" | "3M" => "6m",
        "1y" | "1Y" => "1yr",
        _ => "1m",
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
