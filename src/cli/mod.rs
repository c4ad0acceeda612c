mod auth;
mod show;
mod spreadsheet;
mod tab;
mod values;

use clap::{Parser, Subcommand};
use sheets_kit::config::Config;
use sheets_kit::{HubApi, Result, SpreadsheetClient};

pub use show::ShowResource;
pub use spreadsheet::SpreadsheetCommand;
pub use tab::TabCommand;
pub use values::ValuesCommand;

#[derive(Parser, Debug)]
#[command(name = "sheets-kit")]
#[command(about = "Read, write and organise Google Sheets from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Show { resource } => resource.execute().await,
            Commands::Auth { reset } => auth::execute(*reset).await,
            Commands::Spreadsheet { command } => command.execute().await,
            Commands::Tab { command } => command.execute().await,
            Commands::Values { command } => command.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
    /// Verify Google credentials
    Auth {
        /// Discard cached tokens first
        #[arg(long)]
        reset: bool,
    },
    /// Create, rename and inspect spreadsheets
    Spreadsheet {
        #[command(subcommand)]
        command: SpreadsheetCommand,
    },
    /// Insert, rename and delete tabs
    Tab {
        #[command(subcommand)]
        command: TabCommand,
    },
    /// Read, write and clear cell ranges
    Values {
        #[command(subcommand)]
        command: ValuesCommand,
    },
}

/// Load the config file and open an authenticated client.
pub(crate) async fn connect() -> Result<SpreadsheetClient<HubApi>> {
    let config = Config::load()?;
    let retry = config.retry.policy()?;
    let client = SpreadsheetClient::connect(&config.google)
        .await?
        .with_retry_policy(retry);

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_values_write_requires_input() {
        let result = Cli::try_parse_from(["sheets-kit", "values", "write", "ss", "Sheet1!A1"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "sheets-kit",
            "values",
            "write",
            "ss",
            "Sheet1!A1",
            "--json",
            "[[\"a\"]]",
            "--append",
        ])
        .unwrap();
        match cli.command {
            Commands::Values {
                command:
                    ValuesCommand::Write {
                        append, dimension, ..
                    },
            } => {
                assert!(append);
                assert_eq!(dimension, "rows");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
