mod cli;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crypto_dashboard_core::models::settings::Settings;
use crypto_dashboard_core::services::market_service::{
    key_metrics, market_share, CoinSearch, MARKET_SHARE_TOP_N,
};
use crypto_dashboard_core::CryptoDashboard;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::from_env()?;
    if let Command::Top { limit: Some(limit), .. } = &args.command {
        settings.top_coin_limit = *limit;
    }
    let currency = args
        .currency
        .clone()
        .unwrap_or_else(|| settings.default_currency.clone())
        .to_lowercase();
    if !settings.supports_currency(&currency) {
        return Err(anyhow!(
            "unsupported currency '{currency}', expected one of: {}",
            settings.supported_currencies.join(", ")
        ));
    }

    let dashboard = CryptoDashboard::from_settings(settings).await?;
    if let Some(notice) = dashboard.catalogue_notice() {
        eprintln!("warning: {notice}");
    }
    info!(?dashboard, "dashboard ready");

    match args.command {
        Command::Top { search, .. } => {
            let coins = dashboard.top_coins(Some(&currency)).await?;
            let table = match search.as_deref() {
                Some(query) => dashboard.search(&coins, query),
                None => CoinSearch {
                    matches: coins.clone(),
                    suggestions: Vec::new(),
                },
            };
            print_json(&json!({
                "key_metrics": key_metrics(&coins),
                "coins": table.matches,
                "suggestions": table.suggestions,
                "market_share": market_share(&coins, MARKET_SHARE_TOP_N),
            }))?;
        }
        Command::Resolve { token } => {
            print_json(&json!({
                "token": token,
                "resolution": dashboard.resolve_coin_detailed(&token),
            }))?;
        }
        Command::Trend { coin, days, metric } => {
            let coin_id = dashboard
                .resolve_coin(&coin)
                .ok_or_else(|| anyhow!("could not resolve coin '{coin}'"))?;
            let series = dashboard
                .fetch_metric_trend(&coin_id, &currency, days, metric)
                .await
                .ok_or_else(|| anyhow!("failed to retrieve {days}-day data for {coin_id}"))?;
            print_json(&json!({
                "series": series,
                "change_pct": series.change_pct(),
            }))?;
        }
        Command::Ask { utterance } => {
            let response = dashboard.ask_in(&utterance.join(" "), &currency).await;
            for notice in &response.notices {
                eprintln!("notice: {notice}");
            }
            print_json(&response)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
