use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CoreError;
use crate::models::coin::{KeyMetrics, MarketCoin, MarketShareSlice};
use crate::models::settings::{validate_currency, MAX_COIN_LIMIT, MIN_COIN_LIMIT};
use crate::providers::traits::MarketDataProvider;
use super::catalogue_service::CatalogueIndex;
use super::resolver_service::{normalize_candidate, ResolutionStrategy};
use super::similarity;

/// Slices shown individually in the market-share pie; the rest is "Others".
pub const MARKET_SHARE_TOP_N: usize = 5;

/// How many "did you mean" names a failed search offers.
pub const MAX_SUGGESTIONS: usize = 3;

/// Looser than the resolver threshold: suggestions only need to be plausible.
pub const SUGGESTION_CUTOFF: f64 = 0.6;

/// Outcome of a table search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSearch {
    pub matches: Vec<MarketCoin>,
    /// Close catalogue names, filled only when nothing matched.
    pub suggestions: Vec<String>,
}

/// Market table data: top coins, search and summary figures.
pub struct MarketService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Top coins by market cap. `limit` is clamped to 5..=50.
    pub async fn top_coins(&self, currency: &str, limit: usize) -> Result<Vec<MarketCoin>, CoreError> {
        validate_currency(currency)?;
        let limit = limit.clamp(MIN_COIN_LIMIT, MAX_COIN_LIMIT);
        let currency = currency.trim().to_lowercase();

        let mut coins = self.provider.fetch_top_coins(&currency, limit).await?;
        coins.truncate(limit);
        Ok(coins)
    }

    /// Current market rows for `coin_ids`. Failure gives an empty list.
    pub async fn quotes(&self, coin_ids: &[String], currency: &str) -> Vec<MarketCoin> {
        if coin_ids.is_empty() {
            return Vec::new();
        }
        match self.provider.fetch_quotes(coin_ids, &currency.trim().to_lowercase()).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "quote fetch failed");
                Vec::new()
            }
        }
    }
}

/// Rows whose name or symbol contains `term` (case-insensitive).
/// A blank term keeps every row.
pub fn filter_coins(coins: &[MarketCoin], term: &str) -> Vec<MarketCoin> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return coins.to_vec();
    }
    coins
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&term) || c.symbol.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Search the table, falling back to suggestions from the catalogue.
///
/// 1. Exact name / id / symbol resolution, if that coin is in `coins`.
/// 2. Substring match on name or symbol.
/// 3. Nothing matched: up to three close catalogue names.
pub fn search_coins(coins: &[MarketCoin], index: &CatalogueIndex, query: &str) -> CoinSearch {
    let Some(normalized) = normalize_candidate(query) else {
        return CoinSearch {
            matches: Vec::new(),
            suggestions: Vec::new(),
        };
    };

    let resolved = [
        ResolutionStrategy::ExactName,
        ResolutionStrategy::ExactId,
        ResolutionStrategy::Symbol,
    ]
    .iter()
    .find_map(|s| s.apply(&normalized, index, 1.0));

    if let Some(id) = resolved {
        let matches: Vec<MarketCoin> = coins.iter().filter(|c| c.id == id).cloned().collect();
        if !matches.is_empty() {
            return CoinSearch {
                matches,
                suggestions: Vec::new(),
            };
        }
    }

    let matches = filter_coins(coins, &normalized);
    if !matches.is_empty() {
        return CoinSearch {
            matches,
            suggestions: Vec::new(),
        };
    }

    let suggestions = similarity::close_matches(&normalized, index.name_keys(), MAX_SUGGESTIONS, SUGGESTION_CUTOFF)
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();
    CoinSearch {
        matches: Vec::new(),
        suggestions,
    }
}

/// Headline figures for the first (largest) coin of the table.
pub fn key_metrics(coins: &[MarketCoin]) -> Option<KeyMetrics> {
    coins.first().map(KeyMetrics::from)
}

/// Market-cap distribution: the `top_n` largest coins plus one "Others"
/// slice for the remainder (omitted when nothing remains). Coins without a
/// market cap count as zero.
pub fn market_share(coins: &[MarketCoin], top_n: usize) -> Vec<MarketShareSlice> {
    let mut sorted: Vec<(&str, f64)> = coins
        .iter()
        .map(|c| (c.name.as_str(), c.market_cap.filter(|m| m.is_finite() && *m > 0.0).unwrap_or(0.0)))
        .collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = sorted.iter().map(|(_, cap)| cap).sum();
    let pct = |cap: f64| if total > 0.0 { cap / total * 100.0 } else { 0.0 };

    let split = top_n.min(sorted.len());
    let mut slices: Vec<MarketShareSlice> = sorted[..split]
        .iter()
        .map(|(name, cap)| MarketShareSlice {
            label: name.to_string(),
            market_cap: *cap,
            percentage: pct(*cap),
        })
        .collect();

    if split < sorted.len() {
        let others: f64 = sorted[split..].iter().map(|(_, cap)| cap).sum();
        slices.push(MarketShareSlice {
            label: "Others".to_string(),
            market_cap: others,
            percentage: pct(others),
        });
    }

    slices
}
