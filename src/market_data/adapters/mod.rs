// Shared trait for external market data sources

use serde_json::Value;
use thiserror::Error;

/// Logical endpoints the provider exposes. The adapter owns transport and
/// auth; callers only name the endpoint and its parameters.
pub mod endpoints {
    pub const STOCK: &str = "/stock";
    pub const HISTORICAL: &str = "/historical_data";
    pub const TRENDING: &str = "/trending";
    pub const NEWS: &str = "/news";
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("external source disabled")]
    Disabled,
}

/// "Fetch raw JSON for endpoint Y with params P, or fail." Everything else
/// about the provider is its own concern.
#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchError>;
}

/// Source for offline operation: every fetch fails, so the selector serves
/// synthetic data for everything.
pub struct Offline;

#[async_trait::async_trait]
impl MarketDataSource for Offline {
    async fn fetch(
        &self,
        _endpoint: &str,
        _params: &[(String, String)],
    ) -> Result<Value, FetchError> {
        Err(FetchError::Disabled)
    }
}

pub mod indian_api;
