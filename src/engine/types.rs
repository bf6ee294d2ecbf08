use serde::Serialize;
use std::fmt;

/// Where a produced record came from. Serialized as `"api"` /
/// `"educational_fallback"` so downstream consumers can tell real data
/// from synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Api,
    EducationalFallback,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Api => write!(f, "api"),
            DataSource::EducationalFallback => write!(f, "educational_fallback"),
        }
    }
}

/// Point-in-time quote. Derived and ephemeral, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub prev_close: f64,
    pub name: String,
    pub sector: String,
    pub market_cap: String,
    pub source: DataSource,
    /// Unix seconds.
    pub timestamp: i64,
}

/// One OHLCV bar. Invariants: low <= min(open, close), high >= max(open, close),
/// close > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    /// Unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Candle series for one symbol, tagged with its origin.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub symbol: String,
    pub period: String,
    pub candles: Vec<Candle>,
    pub source: DataSource,
}

/// Single row in a trending list.
#[derive(Debug, Clone, Serialize)]
pub struct Mover {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
    pub volume: u64,
}

/// Top gainers and losers, at most five per side. Gainers are sorted by
/// change percent descending, losers ascending.
#[derive(Debug, Clone, Serialize)]
pub struct Trending {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    /// RFC 3339 timestamp as published.
    pub timestamp: String,
    /// Publisher name, not the api/fallback tag.
    pub source: String,
}

/// News items tagged with their origin.
#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub items: Vec<NewsItem>,
    pub source: DataSource,
}

impl Candle {
    /// OHLC containment plus the positivity rules every generated candle
    /// must satisfy.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
            && self.close > 0.0
    }
}
