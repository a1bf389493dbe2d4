use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::intent::{
    ChartIntent, ChartKind, IntentRequest, Metric, Scope, DEFAULT_DAYS, MAX_DAYS,
};
use crate::models::notice::Notice;
use crate::providers::traits::IntentClassifier;

/// Instruction sent ahead of every user question.
const PROMPT_TEMPLATE: &str = r#"You classify questions for a cryptocurrency dashboard.
Reply with ONE JSON object and nothing else, using exactly these fields:
{
  "type": "chart" | "info",
  "coin_id": string or array of strings (coin names or tickers as the user wrote them, "none" if no coin is mentioned),
  "chart": "line" | "bar" | "pie",
  "days": integer number of days of history,
  "metric": "price" | "volume",
  "scope": "trend" | "current"
}
Use "type": "chart" when the user wants a price/volume chart, trend or current price of specific coins.
Use "type": "info" for anything else (explanations, news, general questions).
Defaults when unspecified: "chart": "line", "days": 7, "metric": "price", "scope": "trend".

Examples:
Q: show me bitcoin's 7-day trend as a bar chart
A: {"type": "chart", "coin_id": "bitcoin", "chart": "bar", "days": 7, "metric": "price", "scope": "trend"}
Q: compare eth and sol volume over the last month
A: {"type": "chart", "coin_id": ["eth", "sol"], "chart": "line", "days": 30, "metric": "volume", "scope": "trend"}
Q: what is a stablecoin?
A: {"type": "info", "coin_id": "none"}

Question: "#;

/// The classified request plus any capability notice raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntent {
    pub request: IntentRequest,
    /// `Some(Notice::ClassificationUnavailable)` when the classifier call failed.
    pub notice: Option<Notice>,
}

/// Turns a free-text question into an [`IntentRequest`] via the classifier.
///
/// Fails open: if the call or the reply goes wrong, the result is
/// `IntentRequest::Info` carrying the original question.
pub struct IntentService {
    classifier: Arc<dyn IntentClassifier>,
}

impl IntentService {
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify `utterance` with exactly one classifier call (none for blank
    /// input). No retries.
    pub async fn parse(&self, utterance: &str) -> ParsedIntent {
        if utterance.trim().is_empty() {
            return ParsedIntent {
                request: IntentRequest::info(utterance),
                notice: None,
            };
        }

        let prompt = build_prompt(utterance);
        match self.classifier.classify(&prompt).await {
            Ok(reply) => ParsedIntent {
                request: interpret_reply(utterance, &reply),
                notice: None,
            },
            Err(e) => {
                warn!(classifier = self.classifier.name(), error = %e, "intent classification unavailable");
                ParsedIntent {
                    request: IntentRequest::info(utterance),
                    notice: Some(Notice::ClassificationUnavailable),
                }
            }
        }
    }
}

/// The full prompt for one question.
pub fn build_prompt(utterance: &str) -> String {
    format!("{PROMPT_TEMPLATE}{}", utterance.trim())
}

/// Remove a markdown code fence (with optional language tag) around `raw`.
/// Text without a fence comes back trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let body = trimmed[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Interpret a classifier reply. Anything that isn't a well-formed chart
/// request becomes `Info` with the original utterance.
pub fn interpret_reply(utterance: &str, reply: &str) -> IntentRequest {
    let body = strip_code_fence(reply);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "classifier reply is not JSON, treating as info");
            return IntentRequest::info(utterance);
        }
    };

    let Some(fields) = value.as_object() else {
        debug!("classifier reply is not a JSON object, treating as info");
        return IntentRequest::info(utterance);
    };

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase());

    match kind.as_deref() {
        Some("chart") => IntentRequest::Chart(chart_intent_from(fields)),
        Some("info") => IntentRequest::info(utterance),
        other => {
            debug!(kind = ?other, "classifier reply has no usable type, treating as info");
            IntentRequest::info(utterance)
        }
    }
}

fn chart_intent_from(fields: &Map<String, Value>) -> ChartIntent {
    let text = |key: &str| fields.get(key).and_then(Value::as_str);

    ChartIntent {
        coin_candidates: coin_candidates(fields.get("coin_id")),
        chart_kind: text("chart").and_then(ChartKind::parse).unwrap_or_default(),
        days: fields.get("days").and_then(coerce_days).unwrap_or(DEFAULT_DAYS),
        metric: text("metric").and_then(Metric::parse).unwrap_or_default(),
        scope: text("scope").and_then(Scope::parse).unwrap_or_default(),
    }
}

/// A bare string becomes a one-element list; arrays keep their string
/// elements in order; anything else means "no candidates".
fn coin_candidates(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Positive whole number of days from a JSON number or numeric string,
/// capped at [`MAX_DAYS`]. Fractions are truncated; zero, negatives and
/// non-numbers give `None`.
fn coerce_days(raw: &Value) -> Option<u32> {
    let days = match raw {
        Value::Number(n) => match n.as_u64() {
            Some(whole) => whole,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() || f < 1.0 {
                    return None;
                }
                f.trunc() as u64
            }
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    if days == 0 {
        return None;
    }
    Some(u32::try_from(days).unwrap_or(MAX_DAYS).min(MAX_DAYS))
}
