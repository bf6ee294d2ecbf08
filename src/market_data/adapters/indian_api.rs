// Indian stock API adapter: GET {base}{endpoint} with an X-Api-Key header.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use super::{FetchError, MarketDataSource};

pub const DEFAULT_BASE_URL: &str = "https://stock.indianapi.in";

/// Single external call is bounded by this; on expiry the request errors and
/// the caller falls back instead of blocking.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct IndianStockApi {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl IndianStockApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl MarketDataSource for IndianStockApi {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!(%url, ?params, "fetching from external api");

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(endpoint, %status, "external api returned non-success status");
            return Err(FetchError::Status(status));
        }

        Ok(response.json::<Value>().await?)
    }
}
