pub mod engine;
pub mod instruments;
pub mod market_data;
pub mod telemetry;
