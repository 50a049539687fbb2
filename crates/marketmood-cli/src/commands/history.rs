use std::fmt::Write as _;

use serde_json::json;
use time::OffsetDateTime;

use marketmood_core::{HistoricalScoreEntry, HistoryStore, Lookback};

use crate::cli::{Cli, HistoryArgs};
use crate::error::CliError;

use super::CommandResult;

const HISTORY_FILE: &str = "score_history.json";

pub fn run(args: &HistoryArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let store = HistoryStore::open(cli.data_dir.join(HISTORY_FILE));

    let entries = store.load()?;
    let lookups = store.lookups(OffsetDateTime::now_utc())?;

    // Newest first for display; the store keeps entries oldest first.
    let recent: Vec<HistoricalScoreEntry> =
        entries.iter().rev().take(args.limit).cloned().collect();

    let data = json!({
        "entries": recent,
        "lookups": lookups,
        "total": entries.len(),
    });

    let mut text = String::new();
    if recent.is_empty() {
        let _ = writeln!(text, "No score history recorded yet.");
    } else {
        let _ = writeln!(
            text,
            "Score history (showing {} of {}):",
            recent.len(),
            entries.len()
        );
        for entry in &recent {
            let _ = writeln!(
                text,
                "  {}  {:>5.1}  {}",
                entry.timestamp, entry.score, entry.status
            );
        }

        let _ = writeln!(text);
        let _ = writeln!(text, "Lookbacks:");
        for lookback in Lookback::ALL {
            match lookups.get(lookback) {
                Some(entry) => {
                    let _ = writeln!(
                        text,
                        "  {:<10} {:.1} [{}]",
                        lookback.as_str(),
                        entry.score,
                        entry.status
                    );
                }
                None => {
                    let _ = writeln!(text, "  {:<10} collecting data", lookback.as_str());
                }
            }
        }
    }

    Ok(CommandResult::new(data, text.trim_end().to_string()))
}
