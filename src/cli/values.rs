use crate::cli::connect;
use clap::Subcommand;
use sheets_kit::values::{self, Grid};
use sheets_kit::{Result, WriteResponse};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ValuesCommand {
    /// Print a range as a JSON grid
    Get {
        spreadsheet_id: String,
        /// A1 notation, e.g. `Sheet1!A1:C10`
        range: String,
        /// Print one cell per line, row by row
        #[arg(long)]
        flat: bool,
        /// Lower-case every cell; all cells must be text
        #[arg(long)]
        lower: bool,
        /// Print each distinct text cell once; all cells must be text
        #[arg(long)]
        unique: bool,
    },
    /// Overwrite a range, or append below it with `--append`
    Write {
        spreadsheet_id: String,
        range: String,
        /// JSON grid, e.g. `[["name", 1], ["bob", 2]]`
        #[arg(long, required_unless_present = "csv", conflicts_with = "csv")]
        json: Option<String>,
        /// Headerless CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// `rows` or `columns`
        #[arg(long, default_value = "rows")]
        dimension: String,
        #[arg(long)]
        append: bool,
    },
    /// Clear a range's values, keeping formatting
    Clear {
        spreadsheet_id: String,
        range: String,
    },
}

impl ValuesCommand {
    pub async fn execute(&self) -> Result<()> {
        let client = connect().await?;

        match self {
            ValuesCommand::Get {
                spreadsheet_id,
                range,
                flat,
                lower,
                unique,
            } => {
                if *unique {
                    let mut strings: Vec<String> = client
                        .get_column_values_as_string_set(spreadsheet_id, range, *lower)
                        .await?
                        .into_iter()
                        .collect();
                    strings.sort();
                    strings.iter().for_each(|s| println!("{}", s));
                } else if *lower {
                    client
                        .get_column_values_as_string(spreadsheet_id, range, true)
                        .await?
                        .iter()
                        .for_each(|s| println!("{}", s));
                } else if *flat {
                    client
                        .get_column_values(spreadsheet_id, range)
                        .await?
                        .iter()
                        .for_each(|cell| println!("{}", cell));
                } else {
                    let grid = client.get_values(spreadsheet_id, range).await?;
                    println!("{}", serde_json::to_string_pretty(&grid)?);
                }
            }
            ValuesCommand::Write {
                spreadsheet_id,
                range,
                json,
                csv,
                dimension,
                append,
            } => {
                let grid = read_grid(json.as_deref(), csv.as_ref())?;
                let response = client
                    .write_range(spreadsheet_id, range, dimension, &grid, !append)
                    .await?;

                let updates = match response {
                    WriteResponse::Updated(updates) => Some(updates),
                    WriteResponse::Appended(appended) => appended.updates,
                };
                info!(
                    updated_range = updates.as_ref().and_then(|u| u.updated_range.as_deref()),
                    updated_cells = updates.as_ref().and_then(|u| u.updated_cells),
                    "Wrote values"
                );
            }
            ValuesCommand::Clear {
                spreadsheet_id,
                range,
            } => {
                client.clear_values(spreadsheet_id, range).await?;
            }
        }

        Ok(())
    }
}

fn read_grid(json: Option<&str>, csv: Option<&PathBuf>) -> Result<Grid> {
    match (json, csv) {
        (Some(json), _) => Ok(serde_json::from_str(json)?),
        (None, Some(path)) => values::from_csv(File::open(path)?),
        (None, None) => Ok(Grid::new()),
    }
}
