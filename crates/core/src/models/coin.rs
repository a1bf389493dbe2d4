use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the provider's coin catalogue.
///
/// `id` is the canonical identifier the market-data provider keys everything
/// by. `name` and `symbol` are for humans and are NOT unique: dozens of coins
/// share tickers like "eth" or names like "Wrapped Bitcoin".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

impl CoinRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// A row of the markets table (top coins by market cap, or current quotes).
///
/// Numeric fields are optional: the provider returns `null` for coins that
/// have no trading data yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Headline figures shown for the top coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub coin_id: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_24h_pct: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

impl From<&MarketCoin> for KeyMetrics {
    fn from(coin: &MarketCoin) -> Self {
        Self {
            coin_id: coin.id.clone(),
            name: coin.name.clone(),
            price: coin.current_price,
            change_24h_pct: coin.price_change_percentage_24h,
            market_cap: coin.market_cap,
            volume_24h: coin.total_volume,
        }
    }
}

/// One slice of the market-cap distribution pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketShareSlice {
    /// Coin name, or "Others" for the aggregated remainder.
    pub label: String,
    pub market_cap: f64,
    /// Share of the total market cap, 0–100.
    pub percentage: f64,
}
