use serde::{Deserialize, Serialize};

/// Non-fatal, user-visible conditions raised while answering a query.
///
/// None of these stop the pipeline; they tell the host what to show next to
/// (or instead of) the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// The coin catalogue could not be fetched; coin lookups will fail.
    CatalogueUnavailable,
    /// The intent classifier failed or ran out of quota.
    ClassificationUnavailable,
    /// None of the requested coins could be matched to a catalogue id.
    UnresolvableCoins { candidates: Vec<String> },
    /// The market-data provider returned nothing for this coin and range.
    EmptyTrendData { coin_id: String, days: u32 },
    /// Current quotes could not be fetched for these coins.
    QuotesUnavailable { coin_ids: Vec<String> },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::CatalogueUnavailable => {
                write!(f, "Coin list is unavailable right now; coin lookups are disabled.")
            }
            Notice::ClassificationUnavailable => {
                write!(f, "The assistant is temporarily unable to respond. Please try again later.")
            }
            Notice::UnresolvableCoins { candidates } => {
                if candidates.is_empty() {
                    write!(f, "Could not identify a coin in your request.")
                } else {
                    write!(f, "Could not resolve coin(s): {}", candidates.join(", "))
                }
            }
            Notice::EmptyTrendData { coin_id, days } => {
                write!(f, "Failed to retrieve {days}-day data for {coin_id}.")
            }
            Notice::QuotesUnavailable { coin_ids } => {
                write!(f, "Failed to retrieve current prices for {}.", coin_ids.join(", "))
            }
        }
    }
}
