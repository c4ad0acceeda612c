use crate::cli::connect;
use clap::Subcommand;
use dialoguer::Confirm;
use sheets_kit::Result;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum TabCommand {
    /// Add a tab
    Insert {
        spreadsheet_id: String,
        name: String,
    },
    /// Rename the first tab called `old_name`
    Rename {
        spreadsheet_id: String,
        old_name: String,
        new_name: String,
    },
    /// Rename a tab by its numeric ID
    RenameId {
        spreadsheet_id: String,
        tab_id: i32,
        new_name: String,
    },
    /// Delete the first tab called `name`
    Delete {
        spreadsheet_id: String,
        name: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl TabCommand {
    pub async fn execute(&self) -> Result<()> {
        let client = connect().await?;

        match self {
            TabCommand::Insert {
                spreadsheet_id,
                name,
            } => {
                let response = client.insert_tab(spreadsheet_id, name).await?;
                let tab_id = response
                    .replies
                    .and_then(|replies| replies.into_iter().next())
                    .and_then(|reply| reply.add_sheet)
                    .and_then(|add_sheet| add_sheet.properties)
                    .and_then(|props| props.sheet_id);
                info!(?tab_id, "Inserted tab");
            }
            TabCommand::Rename {
                spreadsheet_id,
                old_name,
                new_name,
            } => {
                let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
                client
                    .rename_tab_by_name(&spreadsheet, old_name, new_name)
                    .await?;
                info!("Renamed tab");
            }
            TabCommand::RenameId {
                spreadsheet_id,
                tab_id,
                new_name,
            } => {
                client
                    .rename_tab_by_id(spreadsheet_id, new_name, *tab_id)
                    .await?;
                info!("Renamed tab");
            }
            TabCommand::Delete {
                spreadsheet_id,
                name,
                yes,
            } => {
                let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;

                let confirmed = *yes
                    || Confirm::new()
                        .with_prompt(format!("Delete tab '{}' and all of its data?", name))
                        .default(false)
                        .interact()?;
                if !confirmed {
                    info!("Nothing deleted");
                    return Ok(());
                }

                client.delete_tab_by_name(&spreadsheet, name).await?;
                info!("Deleted tab");
            }
        }

        Ok(())
    }
}
