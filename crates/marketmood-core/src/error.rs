use thiserror::Error;

/// Validation errors raised while constructing domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("timestamp is outside the representable range: {seconds}")]
    TimestampOutOfRange { seconds: i64 },

    #[error("sentiment value {value} is outside 0..=100")]
    SentimentOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("coin symbol cannot be empty")]
    EmptySymbol,
}

/// Errors surfaced by the resilient fetcher and the upstream adapters.
///
/// Every variant except [`FetchError::NoDataAvailable`] is recovered
/// internally by the fetcher via cache fallback; callers only see it again
/// when no cached snapshot exists either.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error calling {endpoint}: {detail}")]
    Network { endpoint: &'static str, detail: String },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: &'static str },

    #[error("rate limited by provider on {endpoint}")]
    RateLimited { endpoint: &'static str },

    #[error("unexpected HTTP {status} from {endpoint}")]
    UpstreamStatus { endpoint: &'static str, status: u16 },

    #[error("malformed response from {endpoint}: {detail}")]
    MalformedResponse { endpoint: &'static str, detail: String },

    #[error("no live data and no cached snapshot available: {cause}")]
    NoDataAvailable { cause: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised by the score calculator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// Fewer components were available than the documented minimum.
    #[error("only {available} of 4 score components available, need at least {required}")]
    MissingComponents { available: usize, required: usize },
}

/// Errors raised while persisting the durable fallback snapshot.
///
/// Persistence is best-effort: the fetcher logs these and still returns the
/// in-memory snapshot for the current cycle.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
