use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, warn};

use crate::models::intent::{Metric, MAX_DAYS};
use crate::models::trend::{MarketChart, TrendPoint, TrendSeries};
use crate::providers::traits::MarketDataProvider;

/// Fetches market history for a resolved coin and normalizes it into a
/// [`TrendSeries`].
///
/// "No data" has a single representation: `None`. Provider errors,
/// non-success statuses and empty point lists all end up there; the caller
/// turns that into a user-facing notice.
pub struct TrendService {
    provider: Arc<dyn MarketDataProvider>,
}

impl TrendService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Price history of `coin_id` over the last `days`, quoted in `currency`.
    pub async fn fetch_trend(&self, coin_id: &str, currency: &str, days: u32) -> Option<TrendSeries> {
        self.fetch_metric_trend(coin_id, currency, days, Metric::Price)
            .await
    }

    /// History of `metric` for `coin_id`. `days` is clamped to
    /// `1..=MAX_DAYS`. Granularity is whatever the provider picks for the
    /// range (finer for short ranges).
    pub async fn fetch_metric_trend(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
        metric: Metric,
    ) -> Option<TrendSeries> {
        let currency = currency.trim().to_lowercase();
        let days = days.clamp(1, MAX_DAYS);

        let chart = match self
            .provider
            .fetch_market_chart(coin_id, &currency, days)
            .await
        {
            Ok(chart) => chart,
            Err(e) => {
                warn!(provider = self.provider.name(), coin_id, days, error = %e, "market chart fetch failed");
                return None;
            }
        };

        let series = series_from_chart(coin_id, &currency, days, metric, &chart);
        if series.is_none() {
            warn!(coin_id, days, %metric, "market chart returned no points");
        }
        series
    }
}

/// Convert raw `[epoch_ms, value]` pairs into a [`TrendSeries`].
///
/// Provider order is kept as-is. Pairs with an unrepresentable timestamp or
/// a non-finite value are dropped. A non-ascending sequence is logged as a
/// data-integrity warning but not re-sorted. Zero usable points → `None`.
pub fn series_from_chart(
    coin_id: &str,
    currency: &str,
    days: u32,
    metric: Metric,
    chart: &MarketChart,
) -> Option<TrendSeries> {
    let raw = chart.series(metric);
    let points: Vec<TrendPoint> = raw
        .iter()
        .filter_map(|[millis, value]| {
            if !millis.is_finite() || !value.is_finite() {
                return None;
            }
            let timestamp = DateTime::from_timestamp_millis(*millis as i64)?;
            Some(TrendPoint {
                timestamp,
                value: *value,
            })
        })
        .collect();

    if points.len() < raw.len() {
        debug!(coin_id, dropped = raw.len() - points.len(), "dropped malformed chart points");
    }
    if points.is_empty() {
        return None;
    }

    let series = TrendSeries {
        coin_id: coin_id.to_string(),
        currency: currency.to_string(),
        days,
        metric,
        points,
    };
    if !series.is_ascending() {
        warn!(coin_id, "market chart timestamps are not ascending");
    }
    Some(series)
}
