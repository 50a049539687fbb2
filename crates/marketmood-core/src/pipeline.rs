//! Single entry point for one fetch → score → persist cycle.

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use marketmood_history::{HistoricalLookups, HistoricalScoreEntry, HistoryStore};

use crate::fetcher::Fetcher;
use crate::{score, FetchError, MarketSnapshot, RiskScoreResult, ScoreError, TopMovers};

/// Everything the presentation layer needs from one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodReport {
    pub snapshot: MarketSnapshot,
    pub result: RiskScoreResult,
    pub lookups: HistoricalLookups,
    pub top_movers: TopMovers,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Runs one full cycle: fetch a snapshot, compute the score, persist it to
/// history, and resolve the lookback comparison points.
///
/// Fetching completes before scoring and scoring before the history append.
/// History persistence is best-effort: a failed append or lookup is logged
/// and the in-memory report is still returned.
pub async fn fetch_and_calculate(
    fetcher: &Fetcher,
    history: &HistoryStore,
) -> Result<MoodReport, PipelineError> {
    let snapshot = fetcher.fetch_snapshot().await?;
    let result = score::calculate(&snapshot)?;

    tracing::info!(
        score = result.score,
        status = result.status.label(),
        stale = snapshot.is_stale,
        "risk score computed"
    );

    let entry = HistoricalScoreEntry::new(
        result.computed_at.into_inner(),
        result.score,
        result.status.label(),
        result.message.clone(),
    );
    if let Err(err) = history.append(entry) {
        tracing::warn!(%err, "failed to append score history");
    }

    let lookups = history
        .lookups(OffsetDateTime::now_utc())
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to resolve historical lookups");
            HistoricalLookups::default()
        });

    let top_movers = snapshot.top_movers();

    Ok(MoodReport {
        snapshot,
        result,
        lookups,
        top_movers,
    })
}
