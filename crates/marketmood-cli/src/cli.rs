use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Market Mood: a risk-first crypto market monitor.
#[derive(Debug, Parser)]
#[command(name = "marketmood", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Directory holding the fallback snapshot and score history files.
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch live market data and compute the current risk score.
    Score(ScoreArgs),
    /// Show recorded score history and lookback comparisons.
    History(HistoryArgs),
}

#[derive(Debug, clap::Args)]
pub struct ScoreArgs {
    /// Disable the in-memory snapshot cache so the cycle fetches live.
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

#[derive(Debug, clap::Args)]
pub struct HistoryArgs {
    /// Maximum number of recent entries to show.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
