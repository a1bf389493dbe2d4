use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::settings::Settings;
use super::traits::IntentClassifier;

const PROVIDER: &str = "Gemini";

/// Google Gemini `generateContent` client used as the intent classifier.
///
/// - **Requires**: API key (`GEMINI_API_KEY`), sent as `x-goog-api-key`.
/// - **Free tier**: per-minute and per-day quotas; exhaustion comes back as
///   HTTP 429 / `RESOURCE_EXHAUSTED` and maps to `CoreError::QuotaExhausted`.
/// - Low temperature: the classifier should answer with the same JSON for
///   the same question.
pub struct GeminiClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClassifier {
    pub fn new(settings: &Settings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: settings.gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
            api_key: settings.gemini_api_key.clone(),
        }
    }

    /// True when a key is configured; without one every call fails fast.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Map a failed `generateContent` response to a `CoreError`.
///
/// Quota exhaustion shows up either as 429 or as a `RESOURCE_EXHAUSTED`
/// status in the error body (Gemini sometimes answers 400/403 with it).
pub fn status_error(status: u16, body: &str) -> CoreError {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        return CoreError::QuotaExhausted {
            provider: PROVIDER.into(),
        };
    }
    CoreError::HttpStatus {
        provider: PROVIDER.into(),
        status,
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Pull the first non-empty text part out of a `generateContent` body.
pub fn extract_reply_text(body: &str) -> Result<String, CoreError> {
    let resp: GenerateResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse response: {e}"),
    })?;

    resp.candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text.map(|text| text.trim().to_string()))
        .find(|text| !text.is_empty())
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: "response contained no text".into(),
        })
}

#[async_trait]
impl IntentClassifier for GeminiClassifier {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn classify(&self, prompt: &str) -> Result<String, CoreError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CoreError::Configuration("GEMINI_API_KEY is not set".into()))?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 256,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let body = resp.text().await?;
        extract_reply_text(&body)
    }
}
