use serde::{Deserialize, Serialize};

/// Days of history requested when the classifier doesn't say.
pub const DEFAULT_DAYS: u32 = 7;

/// Longest history a chart may request (10 years). Larger values are clamped.
pub const MAX_DAYS: u32 = 3650;

/// The string the classifier emits when it could not identify any coin.
pub const NO_COIN_SENTINEL: &str = "none";

/// How the rendering layer should draw a chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    /// Parse a classifier value. Unknown values yield `None` so the caller
    /// can apply the default.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "line" => Some(ChartKind::Line),
            "bar" => Some(ChartKind::Bar),
            "pie" => Some(ChartKind::Pie),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::Bar => write!(f, "bar"),
            ChartKind::Pie => write!(f, "pie"),
        }
    }
}

/// Which market series a chart plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Price,
    Volume,
}

impl Metric {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "price" | "prices" => Some(Metric::Price),
            "volume" | "volumes" | "total_volume" => Some(Metric::Volume),
            _ => None,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Price => write!(f, "price"),
            Metric::Volume => write!(f, "volume"),
        }
    }
}

/// Time-series ("trend") or single point-in-time ("current") request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Trend,
    Current,
}

impl Scope {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "trend" => Some(Scope::Trend),
            "current" => Some(Scope::Current),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Trend => write!(f, "trend"),
            Scope::Current => write!(f, "current"),
        }
    }
}

/// A fully-defaulted chart request. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartIntent {
    /// Raw coin tokens as the classifier produced them. May be empty or
    /// contain the `"none"` sentinel; the resolver filters those out.
    pub coin_candidates: Vec<String>,
    pub chart_kind: ChartKind,
    /// Always >= 1.
    pub days: u32,
    pub metric: Metric,
    pub scope: Scope,
}

impl Default for ChartIntent {
    fn default() -> Self {
        Self {
            coin_candidates: Vec::new(),
            chart_kind: ChartKind::default(),
            days: DEFAULT_DAYS,
            metric: Metric::default(),
            scope: Scope::default(),
        }
    }
}

/// What the user asked for.
///
/// The parser only ever returns a complete `Chart` or an `Info` carrying the
/// original utterance; there is no partially-filled state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IntentRequest {
    Chart(ChartIntent),
    Info { raw_text: String },
}

impl IntentRequest {
    pub fn info(raw_text: impl Into<String>) -> Self {
        IntentRequest::Info {
            raw_text: raw_text.into(),
        }
    }

    pub fn is_chart(&self) -> bool {
        matches!(self, IntentRequest::Chart(_))
    }
}
