mod history;
mod score;

use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Machine- and human-readable forms of one command's outcome. The
/// renderer picks one based on the requested format.
pub struct CommandResult {
    pub data: Value,
    pub text: String,
}

impl CommandResult {
    pub fn new(data: Value, text: impl Into<String>) -> Self {
        Self {
            data,
            text: text.into(),
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Score(args) => score::run(args, cli).await,
        Command::History(args) => history::run(args, cli),
    }
}
