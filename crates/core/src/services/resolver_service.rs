use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::intent::NO_COIN_SENTINEL;
use crate::models::settings::DEFAULT_FUZZY_THRESHOLD;
use super::catalogue_service::{normalize_key, CatalogueIndex};
use super::similarity;

/// One way of turning a normalized candidate into a canonical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Exact display-name hit.
    ExactName,
    /// The candidate already is a canonical id.
    ExactId,
    /// Ticker hit; the earliest-indexed coin wins on collisions. That is a
    /// known limitation: it is not "the most popular" coin.
    Symbol,
    /// Closest display name by similarity ratio, above the threshold.
    Fuzzy,
}

impl ResolutionStrategy {
    /// Precedence used by [`CoinResolver::default`].
    pub const DEFAULT_ORDER: [ResolutionStrategy; 4] = [
        ResolutionStrategy::ExactName,
        ResolutionStrategy::ExactId,
        ResolutionStrategy::Symbol,
        ResolutionStrategy::Fuzzy,
    ];

    /// Apply this strategy alone. `normalized` must be trimmed and lowercased.
    pub fn apply(&self, normalized: &str, index: &CatalogueIndex, threshold: f64) -> Option<String> {
        match self {
            ResolutionStrategy::ExactName => index.lookup_name(normalized).map(str::to_string),
            ResolutionStrategy::ExactId => index.lookup_id(normalized).map(str::to_string),
            ResolutionStrategy::Symbol => index
                .lookup_symbol(normalized)
                .and_then(|ids| ids.first())
                .cloned(),
            ResolutionStrategy::Fuzzy => {
                let (key, score) = similarity::best_match(normalized, index.name_keys(), threshold)?;
                debug!(candidate = normalized, matched = key, score, "fuzzy name match");
                index.lookup_name(key).map(str::to_string)
            }
        }
    }
}

/// A successful resolution and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub coin_id: String,
    pub matched_by: ResolutionStrategy,
}

/// Resolves free text ("Bitcoin", "btc", "etherium") to one canonical coin id.
///
/// Strategies run in order and the first hit wins. Resolution is total:
/// malformed input, the `"none"` sentinel and misses all give `None`.
#[derive(Debug, Clone)]
pub struct CoinResolver {
    strategies: Vec<ResolutionStrategy>,
    fuzzy_threshold: f64,
}

impl CoinResolver {
    pub fn new(strategies: Vec<ResolutionStrategy>, fuzzy_threshold: f64) -> Self {
        Self {
            strategies,
            fuzzy_threshold,
        }
    }

    /// Default precedence with a custom fuzzy threshold.
    pub fn with_threshold(fuzzy_threshold: f64) -> Self {
        Self::new(ResolutionStrategy::DEFAULT_ORDER.to_vec(), fuzzy_threshold)
    }

    pub fn strategies(&self) -> &[ResolutionStrategy] {
        &self.strategies
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn resolve(&self, candidate: &str, index: &CatalogueIndex) -> Option<String> {
        self.resolve_detailed(candidate, index).map(|r| r.coin_id)
    }

    /// Like [`CoinResolver::resolve`], also reporting which strategy matched.
    pub fn resolve_detailed(&self, candidate: &str, index: &CatalogueIndex) -> Option<Resolution> {
        let normalized = normalize_candidate(candidate)?;

        let found = self.strategies.iter().find_map(|strategy| {
            strategy
                .apply(&normalized, index, self.fuzzy_threshold)
                .map(|coin_id| Resolution {
                    coin_id,
                    matched_by: *strategy,
                })
        });

        match &found {
            Some(r) => debug!(candidate, coin_id = %r.coin_id, strategy = ?r.matched_by, "coin resolved"),
            None => debug!(candidate, "coin not resolved"),
        }
        found
    }
}

impl Default for CoinResolver {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_FUZZY_THRESHOLD)
    }
}

/// Resolve with the default precedence and threshold.
pub fn resolve(candidate: &str, index: &CatalogueIndex) -> Option<String> {
    CoinResolver::default().resolve(candidate, index)
}

/// Trimmed, lowercased candidate, or `None` for blanks and the sentinel.
pub fn normalize_candidate(candidate: &str) -> Option<String> {
    let normalized = normalize_key(candidate);
    if normalized.is_empty() || normalized == NO_COIN_SENTINEL {
        return None;
    }
    Some(normalized)
}
