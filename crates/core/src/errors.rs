use thiserror::Error;

/// Unified error type for the entire crypto-dashboard-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Services catch these at their boundary and map them to fallback values
/// (empty catalogue, `IntentRequest::Info`, `None` series), so a `CoreError`
/// never aborts a dashboard query.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("HTTP {status} from {provider}")]
    HttpStatus {
        provider: String,
        status: u16,
    },

    #[error("Quota exhausted for {provider}")]
    QuotaExhausted {
        provider: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Payloads ────────────────────────────────────────────────────
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Input / Settings ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; keep only the path.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

/// Strip everything after the first `?` of a message.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
