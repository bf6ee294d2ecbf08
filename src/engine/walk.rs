// Random-walk engine: produces synthetic point quotes and candle series.
// One parameterized walk drives both the history generator and the intraday
// chart generator; the two only differ in their WalkProfile.

use std::time::Duration;

use chrono::{Local, Utc};
use rand::rngs::ThreadRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, instrument};

use crate::engine::state::PriceStateStore;
use crate::engine::types::{Candle, DataSource, Quote};
use crate::instruments;

/// Stored prices older than this are regenerated.
pub const STALENESS: Duration = Duration::from_secs(300);

const MINUTE: i64 = 60;
const DAY_MINUTES: i64 = 60 * 24;
const WEEK_MINUTES: i64 = DAY_MINUTES * 7;

/// (candle count, interval in minutes) for one resolved period.
#[derive(Debug, Clone, Copy)]
pub struct PeriodSpec {
    pub candles: usize,
    pub interval_minutes: i64,
}

/// Canonical table for `historical_series`. Unknown periods fall back to 1d.
pub fn history_spec(period: &str) -> PeriodSpec {
    match period {
        "1w" | "1W" | "5d" => PeriodSpec { candles: 35, interval_minutes: 180 },
        "1m" | "1M" | "30d" => PeriodSpec { candles: 30, interval_minutes: DAY_MINUTES },
        "3m" | "3M" => PeriodSpec { candles: 90, interval_minutes: DAY_MINUTES },
        "1y" | "1Y" => PeriodSpec { candles: 52, interval_minutes: WEEK_MINUTES },
        _ => PeriodSpec { candles: 78, interval_minutes: 5 },
    }
}

/// Table for the standalone chart view. Same 1d shape as the history table
/// but hourly weeks and a 252-trading-day year.
pub fn intraday_spec(period: &str) -> PeriodSpec {
    match period {
        "1w" | "1W" | "5d" => PeriodSpec { candles: 35, interval_minutes: 60 },
        "1m" | "1M" | "30d" => PeriodSpec { candles: 30, interval_minutes: DAY_MINUTES },
        "3m" | "3M" => PeriodSpec { candles: 90, interval_minutes: DAY_MINUTES },
        "1y" | "1Y" => PeriodSpec { candles: 252, interval_minutes: DAY_MINUTES },
        _ => PeriodSpec { candles: 78, interval_minutes: 5 },
    }
}

/// How the series is pinned to wall-clock time.
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    /// Last candle lands on the current time.
    EndAtNow,
    /// First candle starts at the given unix timestamp.
    StartAt(i64),
}

/// Full configuration for one walk. Both generators are expressed as
/// profiles of the same engine so their conventions cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct WalkProfile {
    pub candles: usize,
    pub interval_minutes: i64,
    /// Sigma of the per-step relative return.
    pub step_vol: f64,
    /// Added to each step's return, scaled by the step index.
    pub trend_bias: f64,
    pub volume_range: (u64, u64),
    pub anchor: Anchor,
}

pub struct RandomWalkEngine {
    store: PriceStateStore,
    staleness: Duration,
}

impl Default for RandomWalkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomWalkEngine {
    pub fn new() -> Self {
        Self::with_staleness(STALENESS)
    }

    /// Staleness window is configurable so tests can force regeneration.
    pub fn with_staleness(staleness: Duration) -> Self {
        Self { store: PriceStateStore::new(), staleness }
    }

    pub fn state_store(&self) -> &PriceStateStore {
        &self.store
    }

    /// Next synthetic price for `symbol`. Idempotent inside the staleness
    /// window; on regeneration the price drifts from the previous value and
    /// is clamped to [0.8, 1.2] x base price.
    #[instrument(skip(self))]
    pub fn next_price(&self, symbol: &str) -> f64 {
        let base = instruments::base_price(symbol);
        let vol = instruments::volatility(symbol);
        self.store.advance(symbol, self.staleness, |last| {
            let mut rng = rand::thread_rng();
            let price = match last {
                Some(last) => last * (1.0 + gauss(&mut rng, vol * 0.01)),
                None => base * (1.0 + gauss(&mut rng, 0.02)),
            };
            price.clamp(0.8 * base, 1.2 * base)
        })
    }

    /// Synthetic quote with the full enriched shape.
    pub fn quote(&self, symbol: &str) -> Quote {
        let symbol = symbol.to_uppercase();
        let base = instruments::base_price(&symbol);
        let price = round2(self.next_price(&symbol));
        let change_percent = round2((price - base) / base * 100.0);
        let mut rng = rand::thread_rng();
        let (name, sector, market_cap) = match instruments::lookup(&symbol) {
            Some(i) => (i.name.to_string(), i.sector.to_string(), i.market_cap.to_string()),
            None => (format!("{symbol} Ltd"), "Unknown".to_string(), "N/A".to_string()),
        };
        debug!(%symbol, price, change_percent, "generated fallback quote");
        Quote {
            price,
            change: round2(price - base),
            change_percent,
            volume: rng.gen_range(10_000..=1_000_000),
            high: round2(price * 1.02),
            low: round2(price * 0.98),
            open: round2(price * (1.0 + gauss(&mut rng, 0.005))),
            prev_close: round2(base),
            name,
            sector,
            market_cap,
            source: DataSource::EducationalFallback,
            timestamp: Utc::now().timestamp(),
            symbol,
        }
    }

    /// Candle series ending at the current time, interval volatility scaled
    /// down from the symbol's annualized volatility. An explicit `count`
    /// overrides the period table.
    #[instrument(skip(self))]
    pub fn historical_series(&self, symbol: &str, period: &str, count: Option<usize>) -> Vec<Candle> {
        let spec = history_spec(period);
        let vol = instruments::volatility(symbol);
        let daily_vol = vol / (252.0_f64).sqrt();
        let interval_vol = daily_vol * (spec.interval_minutes as f64 / DAY_MINUTES as f64).sqrt();
        let profile = WalkProfile {
            candles: count.unwrap_or(spec.candles),
            interval_minutes: spec.interval_minutes,
            step_vol: interval_vol,
            trend_bias: 0.0,
            volume_range: (1_000, 100_000),
            anchor: Anchor::EndAtNow,
        };
        self.walk(instruments::base_price(symbol), profile)
    }

    /// Standalone chart series: flat per-class volatility, a small upward
    /// trend bias, heavier volumes, and day bars anchored at the 09:15
    /// session open.
    #[instrument(skip(self))]
    pub fn intraday_series(&self, symbol: &str, period: &str) -> Vec<Candle> {
        let spec = intraday_spec(period);
        let vol = if instruments::is_index(symbol) { 0.015 } else { 0.025 };
        let mut rng = rand::thread_rng();
        // Start within +-10% of the base so charts don't all open on it.
        let start = instruments::base_price(symbol) * (0.9 + rng.gen_range(0.0..0.2));
        let profile = WalkProfile {
            candles: spec.candles,
            interval_minutes: spec.interval_minutes,
            step_vol: vol,
            trend_bias: 0.0001,
            volume_range: (100_000, 1_000_000),
            anchor: Anchor::StartAt(intraday_anchor(period, spec)),
        };
        self.walk(start, profile)
    }

    /// Core walk shared by both generators. Candles come out ascending by
    /// timestamp, spaced exactly `interval_minutes` apart.
    pub fn walk(&self, start_price: f64, profile: WalkProfile) -> Vec<Candle> {
        let mut rng = rand::thread_rng();
        let interval_secs = profile.interval_minutes * MINUTE;
        let first_ts = match profile.anchor {
            Anchor::EndAtNow => {
                Utc::now().timestamp() - (profile.candles as i64 - 1) * interval_secs
            }
            Anchor::StartAt(ts) => ts,
        };

        let mut candles = Vec::with_capacity(profile.candles);
        let mut current = start_price;
        for i in 0..profile.candles {
            let step = gauss(&mut rng, profile.step_vol) + profile.trend_bias * i as f64;
            let new_price = (current * (1.0 + step)).max(1.0);

            let open = current;
            let close = new_price;
            let spread = (close - open).abs();
            let high_extra = rng.gen_range(0.0..0.01) * spread + rng.gen_range(0.0..0.005) * open;
            let low_extra = rng.gen_range(0.0..0.01) * spread + rng.gen_range(0.0..0.005) * open;

            let high = open.max(close) + high_extra;
            let low = (open.min(close) - low_extra).max(new_price * 0.95);
            // The 0.95 floor can overshoot min(open, close); clamp so the
            // containment invariant holds unconditionally.
            let low = low.min(open.min(close));
            let high = high.max(open.max(close));

            candles.push(Candle {
                time: first_ts + i as i64 * interval_secs,
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
                volume: rng.gen_range(profile.volume_range.0..=profile.volume_range.1),
            });
            current = new_price;
        }
        candles
    }
}

/// Day bars anchor at today's 09:15 session open; longer spans walk forward
/// from `now - span`.
fn intraday_anchor(period: &str, spec: PeriodSpec) -> i64 {
    match period {
        "1d" | "1D" => session_open_ts(),
        _ => Utc::now().timestamp() - spec.candles as i64 * spec.interval_minutes * MINUTE,
    }
}

fn session_open_ts() -> i64 {
    let now = Local::now();
    now.date_naive()
        .and_hms_opt(9, 15, 0)
        .and_then(|dt| dt.and_local_timezone(Local).single())
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| now.timestamp())
}

/// Draw from Normal(0, sigma). A degenerate sigma yields a zero step rather
/// than an error.
fn gauss(rng: &mut ThreadRng, sigma: f64) -> f64 {
    Normal::new(0.0, sigma)
        .map(|n| n.sample(rng))
        .unwrap_or(0.0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    #[test]
    fn nifty_1d_has_78_candles_5_minutes_apart() {
        let engine = RandomWalkEngine::new();
        let candles = engine.historical_series("NIFTY", "1d", None);
        assert_eq!(candles.len(), 78);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, 300);
        }
    }

    #[test]
    fn history_ends_at_now_with_exact_spacing() {
        let engine = RandomWalkEngine::new();
        let before = Utc::now().timestamp();
        let candles = engine.historical_series("TCS", "1m", None);
        let after = Utc::now().timestamp();
        assert_eq!(candles.len(), 30);
        let last = candles.last().expect("non-empty").time;
        assert!(last >= before && last <= after);
        let interval = 86_400;
        for (i, c) in candles.iter().enumerate() {
            assert_eq!(c.time, last - (candles.len() as i64 - 1 - i as i64) * interval);
        }
    }

    #[test]
    fn count_override_wins_over_the_table() {
        let engine = RandomWalkEngine::new();
        assert_eq!(engine.historical_series("INFY", "1y", Some(10)).len(), 10);
    }

    #[test]
    fn unknown_period_defaults_to_1d() {
        let engine = RandomWalkEngine::new();
        assert_eq!(engine.historical_series("INFY", "7q", None).len(), 78);
    }

    #[test]
    fn candles_are_well_formed() {
        let engine = RandomWalkEngine::new();
        for period in ["1d", "1w", "1m", "3m", "1y"] {
            for c in engine.historical_series("RELIANCE", period, None) {
                assert!(c.is_well_formed(), "bad candle {c:?} for period {period}");
                assert!(c.volume >= 1_000 && c.volume <= 100_000);
            }
        }
    }

    #[test]
    fn next_price_is_idempotent_within_window() {
        let engine = RandomWalkEngine::new();
        let a = engine.next_price("RELIANCE");
        let b = engine.next_price("RELIANCE");
        assert_eq!(a, b);
    }

    #[test]
    fn regenerated_prices_stay_within_base_bounds() {
        let engine = RandomWalkEngine::with_staleness(Duration::ZERO);
        let base = crate::instruments::base_price("RELIANCE");
        for _ in 0..200 {
            let p = engine.next_price("RELIANCE");
            assert!(p >= 0.8 * base && p <= 1.2 * base, "price {p} out of bounds");
        }
    }

    #[test]
    fn unknown_symbols_walk_around_the_default_base() {
        let engine = RandomWalkEngine::with_staleness(Duration::ZERO);
        for _ in 0..50 {
            let p = engine.next_price("UNLISTED");
            assert!(p >= 800.0 && p <= 1200.0);
        }
    }

    #[test]
    fn fallback_quote_is_fully_enriched() {
        let engine = RandomWalkEngine::new();
        let q = engine.quote("RELIANCE");
        assert_eq!(q.symbol, "RELIANCE");
        assert_eq!(q.source, DataSource::EducationalFallback);
        assert!(q.price >= 0.8 * 2450.0 && q.price <= 1.2 * 2450.0);
        assert!((q.high - round2(q.price * 1.02)).abs() < 1e-9);
        assert!((q.low - round2(q.price * 0.98)).abs() < 1e-9);
        assert!(q.open > 0.0);
        assert_eq!(q.prev_close, 2450.0);
        assert_eq!(q.name, "Reliance Industries Ltd");
    }

    #[test]
    fn intraday_year_has_252_daily_bars() {
        let engine = RandomWalkEngine::new();
        let candles = engine.intraday_series("TCS", "1y");
        assert_eq!(candles.len(), 252);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, 86_400);
        }
    }

    #[test]
    fn intraday_day_bars_anchor_at_session_open() {
        let engine = RandomWalkEngine::new();
        let candles = engine.intraday_series("NIFTY", "1d");
        assert_eq!(candles.len(), 78);
        let first = chrono::DateTime::from_timestamp(candles[0].time, 0)
            .expect("valid timestamp")
            .with_timezone(&Local);
        assert_eq!((first.hour(), first.minute()), (9, 15));
    }

    #[test]
    fn intraday_volumes_use_the_heavier_range() {
        let engine = RandomWalkEngine::new();
        for c in engine.intraday_series("ITC", "1w") {
            assert!(c.volume >= 100_000 && c.volume <= 1_000_000);
        }
    }

    proptest! {
        #[test]
        fn walk_always_produces_contained_ascending_candles(
            start in 1.0f64..50_000.0,
            candles in 1usize..120,
            interval in prop::sample::select(vec![5i64, 60, 180, 1440]),
            vol in 0.0f64..0.2,
            bias in 0.0f64..0.001,
        ) {
            let engine = RandomWalkEngine::new();
            let profile = WalkProfile {
                candles,
                interval_minutes: interval,
                step_vol: vol,
                trend_bias: bias,
                volume_range: (1_000, 100_000),
                anchor: Anchor::EndAtNow,
            };
            let series = engine.walk(start, profile);
            prop_assert_eq!(series.len(), candles);
            for c in &series {
                prop_assert!(c.is_well_formed(), "bad candle {:?}", c);
            }
            for pair in series.windows(2) {
                prop_assert_eq!(pair[1].time - pair[0].time, interval * 60);
            }
        }
    }
}
