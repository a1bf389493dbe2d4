// ═══════════════════════════════════════════════════════════════════
// Provider Tests — CoinGecko payload parsing, HTTP status mapping,
// Gemini reply extraction and configuration, trait object safety
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;

use crypto_dashboard_core::errors::CoreError;
use crypto_dashboard_core::models::coin::CoinRecord;
use crypto_dashboard_core::models::intent::Metric;
use crypto_dashboard_core::models::settings::Settings;
use crypto_dashboard_core::providers::coingecko::{
    self as coingecko, parse_coin_list, parse_market_chart, parse_markets, CoinGeckoProvider,
};
use crypto_dashboard_core::providers::gemini::{self, extract_reply_text, GeminiClassifier};
use crypto_dashboard_core::providers::traits::{IntentClassifier, MarketDataProvider};
use crypto_dashboard_core::services::trend_service::series_from_chart;

// ═══════════════════════════════════════════════════════════════════
// CoinGecko
// ═══════════════════════════════════════════════════════════════════

mod coingecko_coin_list {
    use super::*;

    #[test]
    fn parses_records_in_order() {
        let body = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
        ]"#;
        let records = parse_coin_list(body).unwrap();
        assert_eq!(
            records,
            vec![
                CoinRecord::new("bitcoin", "Bitcoin", "btc"),
                CoinRecord::new("ethereum", "Ethereum", "eth"),
            ]
        );
    }

    #[test]
    fn skips_entries_without_usable_id() {
        let body = r#"[
            {"symbol": "x", "name": "No Id"},
            {"id": "", "symbol": "y", "name": "Empty Id"},
            {"id": 42, "symbol": "z", "name": "Numeric Id"},
            "not an object",
            {"id": "solana", "symbol": "sol", "name": "Solana"}
        ]"#;
        let records = parse_coin_list(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "solana");
    }

    #[test]
    fn missing_name_and_symbol_become_empty() {
        let records = parse_coin_list(r#"[{"id": "mystery"}]"#).unwrap();
        assert_eq!(records, vec![CoinRecord::new("mystery", "", "")]);
    }

    #[test]
    fn empty_array_is_empty_list() {
        assert!(parse_coin_list("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_is_api_error() {
        let err = parse_coin_list(r#"{"status": {"error_code": 429}}"#).unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "CoinGecko"));
    }

    #[test]
    fn invalid_json_is_deserialization_error() {
        let err = parse_coin_list("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

mod coingecko_market_chart {
    use super::*;

    #[test]
    fn parses_all_three_series() {
        let body = r#"{
            "prices": [[1711929600000, 70000.5], [1712016000000, 71000.0]],
            "market_caps": [[1711929600000, 1.38e12]],
            "total_volumes": [[1711929600000, 2.1e10], [1712016000000, 2.3e10]]
        }"#;
        let chart = parse_market_chart(body).unwrap();
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.prices[1], [1712016000000.0, 71000.0]);
        assert_eq!(chart.market_caps.len(), 1);
        assert_eq!(chart.total_volumes.len(), 2);
    }

    #[test]
    fn empty_object_gives_empty_series() {
        let chart = parse_market_chart("{}").unwrap();
        assert!(chart.prices.is_empty());
        assert!(chart.total_volumes.is_empty());
    }

    #[test]
    fn null_samples_drop_only_themselves() {
        let body = r#"{
            "prices": [[1711929600000, 10.0], [1711933200000, null], [1711936800000, 13.0]],
            "market_caps": [],
            "total_volumes": [[1711929600000, 5.0], [1711933200000, null], [1711936800000, 7.0]]
        }"#;
        let chart = parse_market_chart(body).unwrap();

        let prices = series_from_chart("bitcoin", "usd", 1, Metric::Price, &chart).unwrap();
        let values: Vec<f64> = prices.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 13.0]);

        let volumes = series_from_chart("bitcoin", "usd", 1, Metric::Volume, &chart).unwrap();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes.last().unwrap().value, 7.0);
    }

    #[test]
    fn bad_volume_entry_keeps_prices() {
        let body = r#"{
            "prices": [[1711929600000, 10.0], [1711933200000, 11.0]],
            "total_volumes": [[1711929600000, "n/a"], [1711933200000], null, [1, 2, 3]]
        }"#;
        let chart = parse_market_chart(body).unwrap();
        assert_eq!(chart.prices.len(), 2);
        assert!(chart.total_volumes.is_empty());
        assert!(series_from_chart("bitcoin", "usd", 1, Metric::Price, &chart).is_some());
        assert!(series_from_chart("bitcoin", "usd", 1, Metric::Volume, &chart).is_none());
    }

    #[test]
    fn null_series_is_empty() {
        let chart = parse_market_chart(r#"{"prices": null}"#).unwrap();
        assert!(chart.prices.is_empty());
    }

    #[test]
    fn non_object_is_api_error() {
        let err = parse_market_chart("[1, 2]").unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
        assert!(err.to_string().contains("market chart"));
    }
}

mod coingecko_status {
    use super::*;

    #[test]
    fn success_is_no_error() {
        assert!(coingecko::status_error(200).is_none());
        assert!(coingecko::status_error(204).is_none());
    }

    #[test]
    fn rate_limit_is_quota_exhausted() {
        let err = coingecko::status_error(429).unwrap();
        assert!(matches!(err, CoreError::QuotaExhausted { ref provider } if provider == "CoinGecko"));
    }

    #[test]
    fn other_failures_keep_the_status() {
        let err = coingecko::status_error(503).unwrap();
        assert!(matches!(err, CoreError::HttpStatus { status: 503, .. }));
        assert_eq!(err.to_string(), "HTTP 503 from CoinGecko");
        assert!(matches!(coingecko::status_error(404), Some(CoreError::HttpStatus { status: 404, .. })));
    }
}

mod coingecko_markets {
    use super::*;

    #[test]
    fn parses_rows_and_ignores_extra_fields() {
        let body = r#"[{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://example.invalid/btc.png",
            "current_price": 65000.0,
            "market_cap": 1280000000000,
            "market_cap_rank": 1,
            "total_volume": 31000000000,
            "price_change_percentage_24h": -2.35,
            "last_updated": "2024-04-01T10:15:00.000Z"
        }]"#;
        let rows = parse_markets(body).unwrap();
        assert_eq!(rows.len(), 1);
        let btc = &rows[0];
        assert_eq!(btc.id, "bitcoin");
        assert_eq!(btc.current_price, Some(65000.0));
        assert_eq!(btc.market_cap, Some(1.28e12));
        assert_eq!(btc.price_change_percentage_24h, Some(-2.35));
        assert!(btc.last_updated.is_some());
    }

    #[test]
    fn missing_numbers_are_none() {
        let rows = parse_markets(r#"[{"id": "x", "symbol": "x", "name": "X"}]"#).unwrap();
        assert_eq!(rows[0].current_price, None);
        assert_eq!(rows[0].total_volume, None);
    }

    #[test]
    fn non_array_is_api_error() {
        assert!(matches!(parse_markets(r#"{"error": "oops"}"#), Err(CoreError::Api { .. })));
    }
}

mod coingecko_provider {
    use super::*;

    #[test]
    fn name_and_trait_object() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoProvider::new(&Settings::default()));
        assert_eq!(provider.name(), "CoinGecko");
    }

    #[tokio::test]
    async fn quotes_for_no_ids_skip_the_network() {
        let settings = Settings {
            coingecko_base_url: "http://127.0.0.1:9".into(),
            ..Settings::default()
        };
        let provider = CoinGeckoProvider::new(&settings);
        let quotes = provider.fetch_quotes(&[], "usd").await.unwrap();
        assert!(quotes.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Gemini
// ═══════════════════════════════════════════════════════════════════

mod gemini_reply {
    use super::*;

    #[test]
    fn extracts_first_text_part() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "  {\"type\": \"info\"}\n"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(extract_reply_text(body).unwrap(), r#"{"type": "info"}"#);
    }

    #[test]
    fn skips_empty_parts_and_candidates() {
        let body = r#"{
            "candidates": [
                {"finishReason": "SAFETY"},
                {"content": {"parts": [{"text": "   "}, {"text": "hello"}]}}
            ]
        }"#;
        assert_eq!(extract_reply_text(body).unwrap(), "hello");
    }

    #[test]
    fn no_candidates_is_api_error() {
        let err = extract_reply_text(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "Gemini"));
        assert!(err.to_string().contains("no text"));
    }

    #[test]
    fn invalid_body_is_api_error() {
        assert!(matches!(extract_reply_text("not json"), Err(CoreError::Api { .. })));
    }
}

mod gemini_status {
    use super::*;

    #[test]
    fn rate_limit_is_quota_exhausted() {
        let err = gemini::status_error(429, "");
        assert!(matches!(err, CoreError::QuotaExhausted { ref provider } if provider == "Gemini"));
    }

    #[test]
    fn resource_exhausted_body_is_quota_exhausted() {
        let body = r#"{
            "error": {
                "code": 403,
                "message": "Quota exceeded for quota metric 'Generate Content API requests per minute'",
                "status": "RESOURCE_EXHAUSTED"
            }
        }"#;
        assert!(matches!(gemini::status_error(403, body), CoreError::QuotaExhausted { .. }));
    }

    #[test]
    fn other_failures_keep_the_status() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let err = gemini::status_error(400, body);
        assert!(matches!(err, CoreError::HttpStatus { status: 400, ref provider } if provider == "Gemini"));
        assert!(matches!(gemini::status_error(500, ""), CoreError::HttpStatus { status: 500, .. }));
    }
}

mod gemini_classifier {
    use super::*;

    #[test]
    fn configured_only_with_non_blank_key() {
        assert!(!GeminiClassifier::new(&Settings::default()).is_configured());

        let blank = Settings {
            gemini_api_key: Some("  ".into()),
            ..Settings::default()
        };
        assert!(!GeminiClassifier::new(&blank).is_configured());

        let keyed = Settings {
            gemini_api_key: Some("abc".into()),
            ..Settings::default()
        };
        assert!(GeminiClassifier::new(&keyed).is_configured());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let settings = Settings {
            gemini_base_url: "http://127.0.0.1:9".into(),
            ..Settings::default()
        };
        let classifier: Arc<dyn IntentClassifier> = Arc::new(GeminiClassifier::new(&settings));
        assert_eq!(classifier.name(), "Gemini");

        let err = classifier.classify("hello").await.unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
