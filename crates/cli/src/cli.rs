use clap::{Parser, Subcommand};

use crypto_dashboard_core::models::intent::{Metric, DEFAULT_DAYS, MAX_DAYS};

/// Query live crypto market data and ask free-text questions about coins.
#[derive(Debug, Parser)]
#[command(name = "crypto-dashboard", version, about)]
pub struct Args {
    /// Quote currency (usd, eur, sgd). Defaults to CRYPTO_DASHBOARD_CURRENCY or usd.
    #[arg(short, long, global = true)]
    pub currency: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Top coins by market cap, with key metrics and market-share breakdown.
    Top {
        /// Number of coins (5-50).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Filter rows by name or symbol.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Resolve free text ("btc", "Bitcoin", "etherium") to a coin id.
    Resolve { token: String },

    /// Price or volume history for one coin.
    Trend {
        coin: String,

        #[arg(short, long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS)))]
        days: u32,

        #[arg(short, long, default_value = "price", value_parser = parse_metric)]
        metric: Metric,
    },

    /// Ask a question, e.g. "3-day bar chart of ETH".
    Ask {
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
}

fn parse_metric(raw: &str) -> Result<Metric, String> {
    Metric::parse(raw).ok_or_else(|| format!("unknown metric '{raw}' (expected price or volume)"))
}
