use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use marketmood_core::{
    fetch_and_calculate, Fetcher, FetcherConfig, HistoryStore, Lookback, MoodReport,
    ReqwestHttpClient,
};

use crate::cli::{Cli, ScoreArgs};
use crate::error::CliError;

use super::CommandResult;

const FALLBACK_FILE: &str = "snapshot.json";
const HISTORY_FILE: &str = "score_history.json";

pub async fn run(args: &ScoreArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let http = Arc::new(ReqwestHttpClient::new());

    // A zero TTL disables the snapshot cache entirely, so the cycle is
    // guaranteed to go live.
    let mut config = FetcherConfig::default();
    if args.no_cache {
        config.cache_ttl = Duration::ZERO;
    }

    let fetcher = Fetcher::new(http, cli.data_dir.join(FALLBACK_FILE), config);
    let history = HistoryStore::open(cli.data_dir.join(HISTORY_FILE));

    let report = fetch_and_calculate(&fetcher, &history).await?;

    let data = serde_json::to_value(&report)?;
    let text = render_text(&report);

    Ok(CommandResult::new(data, text))
}

fn render_text(report: &MoodReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Market Risk Score: {:.1}/100 [{}]",
        report.result.score,
        report.result.status.label()
    );
    let _ = writeln!(out, "{}", report.result.message);

    if report.snapshot.is_stale {
        let _ = writeln!(
            out,
            "note: live data unavailable, showing cached snapshot from {}",
            report.snapshot.fetched_at.format_rfc3339()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Components:");
    for term in &report.result.components.terms {
        let _ = writeln!(
            out,
            "  {:<14} {:>6.1}  (weight {:.2}, contributes {:.1})",
            term.component.as_str(),
            term.value,
            term.weight,
            term.contribution
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Compared to:");
    for lookback in Lookback::ALL {
        match report.lookups.get(lookback) {
            Some(entry) => {
                let delta = report.result.score - entry.score;
                let _ = writeln!(
                    out,
                    "  {:<10} {:.1} ({:+.1})",
                    lookback.as_str(),
                    entry.score,
                    delta
                );
            }
            None => {
                let _ = writeln!(out, "  {:<10} collecting data", lookback.as_str());
            }
        }
    }

    if let Some(sentiment) = &report.snapshot.sentiment {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Fear & Greed: {} ({})",
            sentiment.value, sentiment.classification
        );
    }

    if let Some(bitcoin) = &report.snapshot.bitcoin {
        let _ = writeln!(
            out,
            "Bitcoin: ${:.0} ({:+.2}% 24h)",
            bitcoin.price_usd, bitcoin.change_24h_pct
        );
    }

    if let Some(global) = &report.snapshot.global {
        let _ = writeln!(
            out,
            "Global: ${:.0}B cap, BTC dominance {:.1}%",
            global.total_market_cap_usd / 1e9,
            global.btc_dominance_pct
        );
    }

    if !report.top_movers.gainers.is_empty() || !report.top_movers.losers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top gainers:");
        for coin in &report.top_movers.gainers {
            let _ = writeln!(out, "  {}", format_mover(coin));
        }
        let _ = writeln!(out, "Top losers:");
        for coin in &report.top_movers.losers {
            let _ = writeln!(out, "  {}", format_mover(coin));
        }
    }

    out.trim_end().to_string()
}

fn format_mover(coin: &marketmood_core::CoinMarketEntry) -> String {
    let change = coin
        .change_24h_pct
        .map(|pct| format!("{pct:+.2}%"))
        .unwrap_or_else(|| "n/a".to_string());
    format!("{:<6} {:<20} {}", coin.symbol, coin.name, change)
}
