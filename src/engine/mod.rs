// Synthetic data engine
pub mod state; // per-symbol price state (lazy, staleness-gated)
pub mod types; // produced shapes: Quote, Candle, Trending, NewsFeed
pub mod walk;  // parameterized random-walk generator
