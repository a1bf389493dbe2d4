pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use tracing::{info, warn};

use errors::CoreError;
use models::{
    chart::{ChartOutcome, QueryOutcome, QueryResponse},
    coin::MarketCoin,
    intent::{ChartIntent, IntentRequest, Metric, Scope},
    notice::Notice,
    settings::{validate_currency, Settings},
    trend::TrendSeries,
};
use providers::{
    coingecko::CoinGeckoProvider,
    gemini::GeminiClassifier,
    traits::{IntentClassifier, MarketDataProvider},
};
use services::{
    catalogue_service::{CatalogueIndex, CatalogueService},
    intent_service::IntentService,
    market_service::{search_coins, CoinSearch, MarketService},
    resolver_service::{normalize_candidate, CoinResolver, Resolution},
    trend_service::TrendService,
};

/// Main entry point for the crypto dashboard core.
///
/// Owns the settings, the shared catalogue index and one service per
/// pipeline stage. `ask` runs a question end to end:
/// classify → resolve coins → fetch series or quotes.
#[must_use]
pub struct CryptoDashboard {
    settings: Settings,
    provider: Arc<dyn MarketDataProvider>,
    catalogue: Arc<CatalogueIndex>,
    /// Set when the last catalogue load failed.
    catalogue_notice: Option<Notice>,
    resolver: CoinResolver,
    intent_service: IntentService,
    trend_service: TrendService,
    market_service: MarketService,
}

impl std::fmt::Debug for CryptoDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoDashboard")
            .field("provider", &self.provider.name())
            .field("catalogue_ids", &self.catalogue.id_count())
            .field("catalogue_notice", &self.catalogue_notice)
            .field("default_currency", &self.settings.default_currency)
            .finish()
    }
}

impl CryptoDashboard {
    /// Build the production stack (CoinGecko + Gemini) and load the catalogue.
    pub async fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoProvider::new(&settings));
        let gemini = GeminiClassifier::new(&settings);
        if !gemini.is_configured() {
            warn!("GEMINI_API_KEY is not set; questions will be answered as info requests");
        }
        let classifier: Arc<dyn IntentClassifier> = Arc::new(gemini);
        Self::connect(settings, provider, classifier).await
    }

    /// Load the catalogue from `provider` and assemble the pipeline.
    /// A failed catalogue fetch degrades to an empty index, not an error.
    pub async fn connect(
        settings: Settings,
        provider: Arc<dyn MarketDataProvider>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let loaded = CatalogueService::new().load(provider.as_ref()).await;
        let mut dashboard = Self::build(settings, provider, classifier, loaded.index);
        dashboard.catalogue_notice = loaded.notice;
        Ok(dashboard)
    }

    /// Assemble the pipeline around an already-built catalogue index
    /// (synthetic catalogues in tests, or one index shared by many sessions).
    pub fn with_catalogue(
        settings: Settings,
        catalogue: Arc<CatalogueIndex>,
        provider: Arc<dyn MarketDataProvider>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings, provider, classifier, catalogue))
    }

    /// Re-fetch the catalogue and swap in a fresh index.
    /// Existing `Arc` handles keep seeing the old snapshot.
    pub async fn reload_catalogue(&mut self) -> Option<Notice> {
        let loaded = CatalogueService::new().load(self.provider.as_ref()).await;
        self.catalogue = loaded.index;
        self.catalogue_notice = loaded.notice.clone();
        loaded.notice
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the current catalogue snapshot.
    #[must_use]
    pub fn catalogue(&self) -> Arc<CatalogueIndex> {
        Arc::clone(&self.catalogue)
    }

    /// `Some(Notice::CatalogueUnavailable)` if the catalogue failed to load.
    #[must_use]
    pub fn catalogue_notice(&self) -> Option<&Notice> {
        self.catalogue_notice.as_ref()
    }

    // ── Single stages ───────────────────────────────────────────────

    /// Resolve free text to a canonical coin id.
    #[must_use]
    pub fn resolve_coin(&self, candidate: &str) -> Option<String> {
        self.resolver.resolve(candidate, &self.catalogue)
    }

    /// Resolve free text, also reporting which strategy matched.
    #[must_use]
    pub fn resolve_coin_detailed(&self, candidate: &str) -> Option<Resolution> {
        self.resolver.resolve_detailed(candidate, &self.catalogue)
    }

    /// Price history for an already-resolved coin id.
    pub async fn fetch_trend(&self, coin_id: &str, currency: &str, days: u32) -> Option<TrendSeries> {
        self.trend_service.fetch_trend(coin_id, currency, days).await
    }

    /// History of any metric for an already-resolved coin id.
    pub async fn fetch_metric_trend(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
        metric: Metric,
    ) -> Option<TrendSeries> {
        self.trend_service
            .fetch_metric_trend(coin_id, currency, days, metric)
            .await
    }

    /// Classify a question without running the rest of the pipeline.
    pub async fn classify(&self, utterance: &str) -> (IntentRequest, Option<Notice>) {
        let parsed = self.intent_service.parse(utterance).await;
        (parsed.request, parsed.notice)
    }

    /// Top coins table in `currency` (default currency when `None`),
    /// sized by the configured limit.
    pub async fn top_coins(&self, currency: Option<&str>) -> Result<Vec<MarketCoin>, CoreError> {
        let currency = currency.unwrap_or(self.settings.default_currency.as_str());
        self.market_service
            .top_coins(currency, self.settings.effective_coin_limit())
            .await
    }

    /// Search a table previously returned by `top_coins`.
    #[must_use]
    pub fn search(&self, coins: &[MarketCoin], query: &str) -> CoinSearch {
        search_coins(coins, &self.catalogue, query)
    }

    // ── Full pipeline ───────────────────────────────────────────────

    /// Answer a question in the default currency.
    pub async fn ask(&self, utterance: &str) -> QueryResponse {
        let currency = self.settings.default_currency.clone();
        self.ask_in(utterance, &currency).await
    }

    /// Answer a question with prices quoted in `currency`.
    ///
    /// Never fails: every degraded stage adds a [`Notice`] instead.
    pub async fn ask_in(&self, utterance: &str, currency: &str) -> QueryResponse {
        let currency = match validate_currency(currency) {
            Ok(()) => currency.trim().to_lowercase(),
            Err(e) => {
                warn!(error = %e, fallback = %self.settings.default_currency, "unusable currency, using default");
                self.settings.default_currency.clone()
            }
        };

        let mut notices = Vec::new();
        let parsed = self.intent_service.parse(utterance).await;
        notices.extend(parsed.notice);

        let outcome = match parsed.request {
            IntentRequest::Info { raw_text } => QueryOutcome::Info { text: raw_text },
            IntentRequest::Chart(intent) => {
                QueryOutcome::Chart(self.run_chart(intent, &currency, &mut notices).await)
            }
        };

        match &outcome {
            QueryOutcome::Chart(chart) => info!(
                coins = ?chart.coin_ids,
                kind = %chart.chart_kind,
                days = chart.days,
                series = chart.series.len(),
                notices = notices.len(),
                "chart query answered"
            ),
            QueryOutcome::Info { .. } => info!(notices = notices.len(), "info query answered"),
        }

        QueryResponse { outcome, notices }
    }

    async fn run_chart(&self, intent: ChartIntent, currency: &str, notices: &mut Vec<Notice>) -> ChartOutcome {
        let mut coin_ids: Vec<String> = Vec::new();
        let mut unresolved = Vec::new();

        for candidate in &intent.coin_candidates {
            if normalize_candidate(candidate).is_none() {
                continue;
            }
            match self.resolver.resolve(candidate, &self.catalogue) {
                Some(id) if !coin_ids.contains(&id) => coin_ids.push(id),
                Some(_) => {}
                None => unresolved.push(candidate.trim().to_string()),
            }
        }

        let mut outcome = ChartOutcome {
            chart_kind: intent.chart_kind,
            metric: intent.metric,
            scope: intent.scope,
            days: intent.days,
            currency: currency.to_string(),
            coin_ids,
            unresolved,
            series: Vec::new(),
            quotes: Vec::new(),
        };

        if outcome.coin_ids.is_empty() {
            if self.catalogue.is_empty() {
                notices.push(Notice::CatalogueUnavailable);
            }
            notices.push(Notice::UnresolvableCoins {
                candidates: outcome.unresolved.clone(),
            });
            return outcome;
        }
        if !outcome.unresolved.is_empty() {
            notices.push(Notice::UnresolvableCoins {
                candidates: outcome.unresolved.clone(),
            });
        }

        match intent.scope {
            Scope::Trend => {
                for coin_id in &outcome.coin_ids {
                    match self
                        .trend_service
                        .fetch_metric_trend(coin_id, currency, intent.days, intent.metric)
                        .await
                    {
                        Some(series) => outcome.series.push(series),
                        None => notices.push(Notice::EmptyTrendData {
                            coin_id: coin_id.clone(),
                            days: intent.days,
                        }),
                    }
                }
            }
            Scope::Current => {
                outcome.quotes = self.market_service.quotes(&outcome.coin_ids, currency).await;
                if outcome.quotes.is_empty() {
                    notices.push(Notice::QuotesUnavailable {
                        coin_ids: outcome.coin_ids.clone(),
                    });
                }
            }
        }

        outcome
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        settings: Settings,
        provider: Arc<dyn MarketDataProvider>,
        classifier: Arc<dyn IntentClassifier>,
        catalogue: Arc<CatalogueIndex>,
    ) -> Self {
        let resolver = CoinResolver::with_threshold(settings.fuzzy_threshold);
        let intent_service = IntentService::new(classifier);
        let trend_service = TrendService::new(Arc::clone(&provider));
        let market_service = MarketService::new(Arc::clone(&provider));

        Self {
            settings,
            provider,
            catalogue,
            catalogue_notice: None,
            resolver,
            intent_service,
            trend_service,
            market_service,
        }
    }
}
