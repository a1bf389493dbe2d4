// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use crypto_dashboard_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "CoinGecko".into(),
            message: "coin list is not a JSON array".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error (CoinGecko): coin list is not a JSON array"
        );
    }

    #[test]
    fn http_status() {
        let err = CoreError::HttpStatus {
            provider: "CoinGecko".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP 503 from CoinGecko");
    }

    #[test]
    fn quota_exhausted() {
        let err = CoreError::QuotaExhausted {
            provider: "Gemini".into(),
        };
        assert_eq!(err.to_string(), "Quota exhausted for Gemini");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("missing field `id`".into());
        assert_eq!(err.to_string(), "Deserialization error: missing field `id`");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("bad currency".into());
        assert_eq!(err.to_string(), "Validation failed: bad currency");
    }

    #[test]
    fn configuration() {
        let err = CoreError::Configuration("GEMINI_API_KEY is not set".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: GEMINI_API_KEY is not set"
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
        assert!(err.to_string().starts_with("Deserialization error: "));
    }

    #[test]
    fn question_mark_converts_serde_errors() {
        fn parse(raw: &str) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str(raw)?)
        }
        assert!(parse("[1, 2]").is_ok());
        assert!(matches!(parse("]"), Err(CoreError::Deserialization(_))));
    }

    #[test]
    fn core_error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CoreError>();
    }
}
