use crate::cli::connect;
use clap::Subcommand;
use sheets_kit::Result;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum SpreadsheetCommand {
    /// Create a spreadsheet with one empty tab
    Create { title: String },
    /// Change a spreadsheet's title
    Rename {
        spreadsheet_id: String,
        title: String,
    },
    /// List a spreadsheet's tabs as `<id>\t<title>`
    Show { spreadsheet_id: String },
}

impl SpreadsheetCommand {
    pub async fn execute(&self) -> Result<()> {
        let client = connect().await?;

        match self {
            SpreadsheetCommand::Create { title } => {
                let created = client.create_spreadsheet(title).await?;
                println!("{}", created.spreadsheet_id.unwrap_or_default());
            }
            SpreadsheetCommand::Rename {
                spreadsheet_id,
                title,
            } => {
                client.rename_spreadsheet(spreadsheet_id, title).await?;
            }
            SpreadsheetCommand::Show { spreadsheet_id } => {
                let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
                let title = spreadsheet
                    .properties
                    .and_then(|p| p.title)
                    .unwrap_or_default();
                info!(title = %title, url = spreadsheet.spreadsheet_url.as_deref().unwrap_or_default(), "Spreadsheet");

                for sheet in spreadsheet.sheets.unwrap_or_default() {
                    let props = sheet.properties.unwrap_or_default();
                    println!(
                        "{}\t{}",
                        props.sheet_id.unwrap_or_default(),
                        props.title.unwrap_or_default()
                    );
                }
            }
        }

        Ok(())
    }
}
