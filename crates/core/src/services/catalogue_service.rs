use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::coin::CoinRecord;
use crate::models::notice::Notice;
use crate::providers::traits::MarketDataProvider;

/// Disambiguation index over the coin catalogue.
///
/// Three lookups, all keyed by trimmed lowercase text:
/// - **name → id**: first coin seen with a given display name wins; later
///   coins with the same name are dropped so a popular coin can't be
///   shadowed by a clone listed after it.
/// - **id → id**: identity, confirms a string already is a canonical id.
/// - **symbol → [ids]**: every coin sharing a ticker, in catalogue order.
///   Never empty for a present key.
///
/// Built once per catalogue snapshot and never mutated afterwards, so it can
/// be shared behind an `Arc` and read concurrently without locking.
#[derive(Debug, Clone, Default)]
pub struct CatalogueIndex {
    name_index: HashMap<String, String>,
    /// Name keys in insertion order; fuzzy matching walks this.
    name_keys: Vec<String>,
    id_index: HashMap<String, String>,
    symbol_index: HashMap<String, Vec<String>>,
    record_count: usize,
}

impl CatalogueIndex {
    /// An index with no coins. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from catalogue records. Pure: no I/O, no side effects.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CoinRecord>,
    {
        let mut index = Self::default();

        for record in records {
            index.record_count += 1;

            let id = record.id.trim();
            if id.is_empty() {
                continue;
            }

            let name = normalize_key(&record.name);
            if !name.is_empty() && !index.name_index.contains_key(&name) {
                index.name_index.insert(name.clone(), id.to_string());
                index.name_keys.push(name);
            }

            let id_key = normalize_key(id);
            index
                .id_index
                .entry(id_key)
                .or_insert_with(|| id.to_string());

            let symbol = normalize_key(&record.symbol);
            if !symbol.is_empty() {
                index
                    .symbol_index
                    .entry(symbol)
                    .or_default()
                    .push(id.to_string());
            }
        }

        index
    }

    /// Exact display-name lookup. `key` must already be normalized.
    pub fn lookup_name(&self, key: &str) -> Option<&str> {
        self.name_index.get(key).map(String::as_str)
    }

    /// Exact canonical-id lookup. `key` must already be normalized.
    pub fn lookup_id(&self, key: &str) -> Option<&str> {
        self.id_index.get(key).map(String::as_str)
    }

    /// All ids sharing a ticker, in catalogue order. `key` must already be normalized.
    pub fn lookup_symbol(&self, key: &str) -> Option<&[String]> {
        self.symbol_index
            .get(key)
            .map(Vec::as_slice)
            .filter(|ids| !ids.is_empty())
    }

    /// Name keys in the order they were first indexed.
    pub fn name_keys(&self) -> impl Iterator<Item = &str> {
        self.name_keys.iter().map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_index.contains_key(&normalize_key(id))
    }

    pub fn name_count(&self) -> usize {
        self.name_index.len()
    }

    pub fn id_count(&self) -> usize {
        self.id_index.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbol_index.len()
    }

    /// Number of records the index was built from, including skipped ones.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }
}

/// Trim + lowercase, the normalization every index key goes through.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A freshly loaded catalogue plus the notice to surface if loading failed.
#[derive(Debug, Clone)]
pub struct LoadedCatalogue {
    pub index: Arc<CatalogueIndex>,
    pub notice: Option<Notice>,
}

/// Fetches the coin catalogue and turns it into a [`CatalogueIndex`].
pub struct CatalogueService;

impl CatalogueService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the catalogue once and index it.
    ///
    /// A failed fetch is not an error: it yields an empty index plus
    /// `Notice::CatalogueUnavailable`, and every later resolution misses.
    pub async fn load(&self, provider: &dyn MarketDataProvider) -> LoadedCatalogue {
        match provider.fetch_coin_list().await {
            Ok(records) => {
                let index = CatalogueIndex::build(&records);
                info!(
                    provider = provider.name(),
                    records = index.record_count(),
                    names = index.name_count(),
                    symbols = index.symbol_count(),
                    "coin catalogue indexed"
                );
                LoadedCatalogue {
                    index: Arc::new(index),
                    notice: None,
                }
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "coin catalogue unavailable, using empty index");
                LoadedCatalogue {
                    index: Arc::new(CatalogueIndex::empty()),
                    notice: Some(Notice::CatalogueUnavailable),
                }
            }
        }
    }
}

impl Default for CatalogueService {
    fn default() -> Self {
        Self::new()
    }
}
