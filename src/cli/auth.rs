use crate::cli::connect;
use sheets_kit::Result;
use sheets_kit::sheets::clear_sheets_tokens;
use tracing::info;

pub async fn execute(reset: bool) -> Result<()> {
    if reset {
        clear_sheets_tokens()?;
    }

    let client = connect().await?;

    info!(subject = client.subject(), "Google Sheets authentication verified");

    Ok(())
}
