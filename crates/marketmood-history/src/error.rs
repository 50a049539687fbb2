use thiserror::Error;

/// Errors raised by the history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not acquire history lock {path} after {attempts} attempts")]
    LockContended { path: String, attempts: u32 },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
