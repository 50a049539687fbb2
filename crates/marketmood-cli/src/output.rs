use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            println!("{payload}");
        }
        OutputFormat::Text => {
            println!("{}", result.text);
        }
    }

    Ok(())
}
