use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// One persisted score observation. Append-only; the store owns the
/// ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalScoreEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub score: f64,
    pub status: String,
    pub message: String,
}

impl HistoricalScoreEntry {
    /// Scores are stored at one decimal of precision, matching the
    /// presentation contract of the history file.
    pub fn new(
        timestamp: OffsetDateTime,
        score: f64,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            score: (score * 10.0).round() / 10.0,
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Named historical offset queried against the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    Yesterday,
    LastWeek,
    LastMonth,
}

impl Lookback {
    /// Resolution order for sequential exclusion is fixed: the shortest
    /// offset claims its entry first.
    pub const ALL: [Self; 3] = [Self::Yesterday, Self::LastWeek, Self::LastMonth];

    pub const fn offset(self) -> Duration {
        match self {
            Self::Yesterday => Duration::days(1),
            Self::LastWeek => Duration::days(7),
            Self::LastMonth => Duration::days(30),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::LastWeek => "last_week",
            Self::LastMonth => "last_month",
        }
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One batch of resolved comparison points. `None` means "collecting
/// data": no unclaimed entry fell inside the tolerance window.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoricalLookups {
    pub now: Option<HistoricalScoreEntry>,
    pub yesterday: Option<HistoricalScoreEntry>,
    pub last_week: Option<HistoricalScoreEntry>,
    pub last_month: Option<HistoricalScoreEntry>,
}

impl HistoricalLookups {
    pub fn get(&self, lookback: Lookback) -> Option<&HistoricalScoreEntry> {
        match lookback {
            Lookback::Yesterday => self.yesterday.as_ref(),
            Lookback::LastWeek => self.last_week.as_ref(),
            Lookback::LastMonth => self.last_month.as_ref(),
        }
    }
}
