use serde::{Deserialize, Serialize};

use super::coin::MarketCoin;
use super::intent::{ChartKind, Metric, Scope};
use super::notice::Notice;
use super::trend::TrendSeries;

/// A chart request after coin resolution and data fetching.
///
/// The rendering layer only draws it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOutcome {
    pub chart_kind: ChartKind,
    pub metric: Metric,
    pub scope: Scope,
    pub days: u32,
    pub currency: String,

    /// Canonical ids the candidates resolved to, deduplicated, in request order.
    pub coin_ids: Vec<String>,

    /// Candidates that resolved to nothing (sentinel and blanks excluded).
    pub unresolved: Vec<String>,

    /// One series per coin that returned data (trend scope only).
    pub series: Vec<TrendSeries>,

    /// Current quotes for the resolved coins (current scope only).
    pub quotes: Vec<MarketCoin>,
}

impl ChartOutcome {
    /// Convenience for single-coin requests.
    pub fn primary_coin(&self) -> Option<&str> {
        self.coin_ids.first().map(String::as_str)
    }

    pub fn series_for(&self, coin_id: &str) -> Option<&TrendSeries> {
        self.series.iter().find(|s| s.coin_id == coin_id)
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty() || !self.quotes.is_empty()
    }
}

/// Final result of one dashboard question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryOutcome {
    Chart(ChartOutcome),
    /// General question; the host decides how to answer it.
    Info { text: String },
}

/// What `CryptoDashboard::ask` hands to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub outcome: QueryOutcome,
    pub notices: Vec<Notice>,
}

impl QueryResponse {
    pub fn chart(&self) -> Option<&ChartOutcome> {
        match &self.outcome {
            QueryOutcome::Chart(chart) => Some(chart),
            QueryOutcome::Info { .. } => None,
        }
    }
}
