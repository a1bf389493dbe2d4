use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::coin::{CoinRecord, MarketCoin};
use crate::models::trend::MarketChart;

/// Market-data collaborator (CoinGecko in production, mocks in tests).
///
/// Implementations report every failure (transport, non-success status,
/// unparseable body) as `Err`. Deciding what a failure *means* (empty
/// catalogue, missing series) is the services' job, not the provider's.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// The full coin catalogue (`id`, `name`, `symbol` for every coin).
    async fn fetch_coin_list(&self) -> Result<Vec<CoinRecord>, CoreError>;

    /// Price / market-cap / volume history for `coin_id` over the last `days`.
    /// Granularity is chosen by the provider from the range.
    async fn fetch_market_chart(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
    ) -> Result<MarketChart, CoreError>;

    /// Top `limit` coins by market cap, quoted in `currency`.
    async fn fetch_top_coins(
        &self,
        currency: &str,
        limit: usize,
    ) -> Result<Vec<MarketCoin>, CoreError>;

    /// Current market rows for specific coins.
    async fn fetch_quotes(
        &self,
        coin_ids: &[String],
        currency: &str,
    ) -> Result<Vec<MarketCoin>, CoreError>;
}

/// Language-model collaborator used to classify free-text questions.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Send `prompt`, return the model's raw text reply. The reply is
    /// expected, but not guaranteed, to contain one JSON object, possibly
    /// wrapped in a markdown code fence.
    async fn classify(&self, prompt: &str) -> Result<String, CoreError>;
}
