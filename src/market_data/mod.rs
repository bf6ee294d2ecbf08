// Market data module entrypoint
pub mod adapters;   // provider-specific fetchers (Indian stock api, Offline)
pub mod normaliser; // maps payload field aliases -> canonical shapes
pub mod cache;      // TTL memoization of raw payloads per (endpoint, params)
pub mod selector;   // api-first source selection with synthetic fallback
pub mod aggregator; // composite bulk responses
