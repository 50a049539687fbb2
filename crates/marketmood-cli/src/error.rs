use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] marketmood_core::PipelineError),

    #[error(transparent)]
    History(#[from] marketmood_core::HistoryError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Pipeline(_) => 2,
            Self::History(_) => 4,
            Self::Serialization(_) => 10,
        }
    }
}
