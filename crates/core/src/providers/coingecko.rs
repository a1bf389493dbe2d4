use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::coin::{CoinRecord, MarketCoin};
use crate::models::settings::Settings;
use crate::models::trend::MarketChart;
use super::traits::MarketDataProvider;

const PROVIDER: &str = "CoinGecko";

/// CoinGecko API provider for the coin catalogue and market data.
///
/// - **Free tier**: no key required, ~10–30 calls/minute.
/// - **Optional key**: sent as `x-cg-demo-api-key` when configured.
/// - **Endpoints**: `/coins/list`, `/coins/markets`, `/coins/{id}/market_chart`.
///
/// CoinGecko keys everything by lowercase ids like "bitcoin", "ethereum";
/// turning user text into those ids is the resolver's job, not this one's.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(settings: &Settings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: settings.coingecko_base_url.trim_end_matches('/').to_string(),
            api_key: settings.coingecko_api_key.clone(),
        }
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, CoreError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }
        let resp = check_status(request.send().await?)?;
        Ok(resp.text().await?)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

fn check_status(resp: Response) -> Result<Response, CoreError> {
    match status_error(resp.status().as_u16()) {
        Some(err) => Err(err),
        None => Ok(resp),
    }
}

/// Map an HTTP status to the matching `CoreError`; `None` for 2xx.
/// 429 is the free-tier rate limit.
pub fn status_error(status: u16) -> Option<CoreError> {
    match status {
        200..=299 => None,
        429 => Some(CoreError::QuotaExhausted {
            provider: PROVIDER.into(),
        }),
        _ => Some(CoreError::HttpStatus {
            provider: PROVIDER.into(),
            status,
        }),
    }
}

// ── Payload parsing ─────────────────────────────────────────────────

/// Parse a `/coins/list` body.
///
/// Entries that aren't objects or have no string `id` are skipped; missing
/// `name`/`symbol` become empty strings (the index ignores empty keys).
pub fn parse_coin_list(body: &str) -> Result<Vec<CoinRecord>, CoreError> {
    let parsed: Value = serde_json::from_str(body)?;
    let entries = parsed.as_array().ok_or_else(|| CoreError::Api {
        provider: PROVIDER.into(),
        message: "coin list is not a JSON array".into(),
    })?;

    let records = entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = obj.get("id")?.as_str()?.trim();
            if id.is_empty() {
                return None;
            }
            let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or("").to_string();
            Some(CoinRecord::new(id, text("name"), text("symbol")))
        })
        .collect();

    Ok(records)
}

/// Parse a `/coins/{id}/market_chart` body.
pub fn parse_market_chart(body: &str) -> Result<MarketChart, CoreError> {
    serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse market chart: {e}"),
    })
}

/// Parse a `/coins/markets` body.
pub fn parse_markets(body: &str) -> Result<Vec<MarketCoin>, CoreError> {
    serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse markets: {e}"),
    })
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_coin_list(&self) -> Result<Vec<CoinRecord>, CoreError> {
        let body = self.get_text("/coins/list", &[]).await?;
        parse_coin_list(&body)
    }

    async fn fetch_market_chart(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
    ) -> Result<MarketChart, CoreError> {
        let path = format!("/coins/{}/market_chart", coin_id.trim());
        let body = self
            .get_text(
                &path,
                &[
                    ("vs_currency", currency.to_lowercase()),
                    ("days", days.to_string()),
                ],
            )
            .await?;
        parse_market_chart(&body)
    }

    async fn fetch_top_coins(
        &self,
        currency: &str,
        limit: usize,
    ) -> Result<Vec<MarketCoin>, CoreError> {
        let body = self
            .get_text(
                "/coins/markets",
                &[
                    ("vs_currency", currency.to_lowercase()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", limit.to_string()),
                    ("page", "1".to_string()),
                    ("sparkline", "false".to_string()),
                ],
            )
            .await?;
        parse_markets(&body)
    }

    async fn fetch_quotes(
        &self,
        coin_ids: &[String],
        currency: &str,
    ) -> Result<Vec<MarketCoin>, CoreError> {
        if coin_ids.is_empty() {
            return Ok(Vec::new());
        }
        let body = self
            .get_text(
                "/coins/markets",
                &[
                    ("vs_currency", currency.to_lowercase()),
                    ("ids", coin_ids.join(",")),
                    ("sparkline", "false".to_string()),
                ],
            )
            .await?;
        parse_markets(&body)
    }
}
