use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Minimum and maximum number of rows in the top-coins table.
pub const MIN_COIN_LIMIT: usize = 5;
pub const MAX_COIN_LIMIT: usize = 50;

/// Similarity a fuzzy name match must reach to be accepted.
/// Empirical value; tune with care, tests pin both sides of it.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Process-lifetime settings for the dashboard core.
///
/// Built from `Default` and overlaid with environment variables by
/// [`Settings::from_env`]. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quote currency used when a request doesn't name one (lowercase, e.g. "usd").
    pub default_currency: String,

    /// Currencies the dashboard offers for display.
    pub supported_currencies: Vec<String>,

    /// Rows in the top-coins table, clamped to `MIN_COIN_LIMIT..=MAX_COIN_LIMIT`.
    pub top_coin_limit: usize,

    pub fuzzy_threshold: f64,

    /// Timeout applied to every outbound HTTP call.
    pub http_timeout_secs: u64,

    pub coingecko_base_url: String,
    /// Optional demo/pro key, sent as `x-cg-demo-api-key`.
    pub coingecko_api_key: Option<String>,

    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "usd".to_string(),
            supported_currencies: vec!["usd".to_string(), "eur".to_string(), "sgd".to_string()],
            top_coin_limit: 10,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            http_timeout_secs: 15,
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            coingecko_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_api_key: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with environment variables:
    ///
    /// | variable | field |
    /// |---|---|
    /// | `CRYPTO_DASHBOARD_CURRENCY` | `default_currency` |
    /// | `CRYPTO_DASHBOARD_TOP_LIMIT` | `top_coin_limit` |
    /// | `CRYPTO_DASHBOARD_FUZZY_THRESHOLD` | `fuzzy_threshold` |
    /// | `CRYPTO_DASHBOARD_HTTP_TIMEOUT_SECS` | `http_timeout_secs` |
    /// | `COINGECKO_BASE_URL` / `COINGECKO_API_KEY` | CoinGecko access |
    /// | `GEMINI_BASE_URL` / `GEMINI_MODEL` / `GEMINI_API_KEY` | Gemini access |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(currency) = get("CRYPTO_DASHBOARD_CURRENCY") {
            settings.default_currency = currency.to_lowercase();
        }
        if let Some(limit) = get("CRYPTO_DASHBOARD_TOP_LIMIT") {
            settings.top_coin_limit = parse_var("CRYPTO_DASHBOARD_TOP_LIMIT", &limit)?;
        }
        if let Some(threshold) = get("CRYPTO_DASHBOARD_FUZZY_THRESHOLD") {
            settings.fuzzy_threshold = parse_var("CRYPTO_DASHBOARD_FUZZY_THRESHOLD", &threshold)?;
        }
        if let Some(timeout) = get("CRYPTO_DASHBOARD_HTTP_TIMEOUT_SECS") {
            settings.http_timeout_secs = parse_var("CRYPTO_DASHBOARD_HTTP_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(url) = get("COINGECKO_BASE_URL") {
            settings.coingecko_base_url = url.trim_end_matches('/').to_string();
        }
        settings.coingecko_api_key = get("COINGECKO_API_KEY");
        if let Some(url) = get("GEMINI_BASE_URL") {
            settings.gemini_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GEMINI_MODEL") {
            settings.gemini_model = model;
        }
        settings.gemini_api_key = get("GEMINI_API_KEY");

        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that the rest of the core relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_currency(&self.default_currency)?;
        for currency in &self.supported_currencies {
            validate_currency(currency)?;
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(CoreError::Configuration(format!(
                "fuzzy threshold must be within 0.0..=1.0, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(CoreError::Configuration(
                "HTTP timeout must be at least one second".into(),
            ));
        }
        Ok(())
    }

    /// The configured top-coin limit, clamped to the supported range.
    pub fn effective_coin_limit(&self) -> usize {
        self.top_coin_limit.clamp(MIN_COIN_LIMIT, MAX_COIN_LIMIT)
    }

    pub fn supports_currency(&self, currency: &str) -> bool {
        let lower = currency.trim().to_lowercase();
        self.supported_currencies.iter().any(|c| c.eq_ignore_ascii_case(&lower))
    }
}

/// Currency codes are exactly three ASCII letters (e.g. "usd", "EUR").
pub fn validate_currency(currency: &str) -> Result<(), CoreError> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::ValidationError(format!(
            "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., usd, eur, sgd)"
        )));
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| CoreError::Configuration(format!("{key}={raw}: {e}")))
}
