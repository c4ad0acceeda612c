use crate::error::Result;
use async_trait::async_trait;
use google_sheets4::api::{
    AppendValuesResponse, BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse,
    ClearValuesResponse, Spreadsheet, UpdateValuesResponse, ValueRange,
};

/// How the service interprets written values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored as-is.
    Raw,
    /// Parsed as if typed into the UI, so formulas and formatted numbers
    /// are interpreted.
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

/// The remote calls the spreadsheet client is built on.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    fn base_url(&self) -> &str;

    async fn create(&self, spreadsheet: Spreadsheet) -> Result<Spreadsheet>;

    async fn get(&self, spreadsheet_id: &str) -> Result<Spreadsheet>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse>;

    async fn values_get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;

    async fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse>;

    async fn values_append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse>;

    async fn values_clear(&self, spreadsheet_id: &str, range: &str) -> Result<ClearValuesResponse>;
}
