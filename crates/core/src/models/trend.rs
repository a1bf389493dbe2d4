use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::intent::Metric;

/// A single (timestamp → value) sample of a market series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Raw market-chart payload as the provider returns it:
/// `[epoch_millis, value]` pairs per series.
///
/// Each array is read sample by sample: a `null`, a non-number or a pair of
/// the wrong length is dropped on its own and the rest of the series kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    #[serde(default, deserialize_with = "lenient_pairs")]
    pub prices: Vec<[f64; 2]>,
    #[serde(default, deserialize_with = "lenient_pairs")]
    pub market_caps: Vec<[f64; 2]>,
    #[serde(default, deserialize_with = "lenient_pairs")]
    pub total_volumes: Vec<[f64; 2]>,
}

fn lenient_pairs<'de, D>(deserializer: D) -> Result<Vec<[f64; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().filter_map(numeric_pair).collect())
}

fn numeric_pair(entry: &Value) -> Option<[f64; 2]> {
    match entry.as_array()?.as_slice() {
        [timestamp, value] => Some([timestamp.as_f64()?, value.as_f64()?]),
        _ => None,
    }
}

impl MarketChart {
    pub fn series(&self, metric: Metric) -> &[[f64; 2]] {
        match metric {
            Metric::Price => &self.prices,
            Metric::Volume => &self.total_volumes,
        }
    }
}

/// Time series for one coin, ordered by timestamp ascending.
///
/// A `TrendSeries` is never empty: the executor reports "no data" as `None`
/// instead of constructing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub coin_id: String,
    /// Lowercase quote currency, e.g. "usd".
    pub currency: String,
    pub days: u32,
    pub metric: Metric,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrendPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrendPoint> {
        self.points.last()
    }

    /// Percentage change from the first to the last point.
    /// `None` when the first value is zero.
    pub fn change_pct(&self) -> Option<f64> {
        let first = self.first()?.value;
        let last = self.last()?.value;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }

    /// True when every timestamp is >= the previous one.
    pub fn is_ascending(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
