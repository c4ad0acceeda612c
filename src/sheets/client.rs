use super::api::{SheetsApi, ValueInputOption};
use super::hub::HubApi;
use super::{requests, tabs};
use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use crate::retry::RetryPolicy;
use crate::values::{self, CellValue, Grid};
use google_sheets4::api::{
    AppendValuesResponse, BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse,
    ClearValuesResponse, Request, Spreadsheet, SpreadsheetProperties, UpdateValuesResponse,
    ValueRange,
};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Result of [`SpreadsheetClient::write_range`].
#[derive(Debug, Clone)]
pub enum WriteResponse {
    Updated(UpdateValuesResponse),
    Appended(AppendValuesResponse),
}

/// Range and tab helpers for one authenticated session.
pub struct SpreadsheetClient<A> {
    api: A,
    subject: String,
    retry: RetryPolicy,
    call_timeout: Option<Duration>,
}

impl SpreadsheetClient<HubApi> {
    /// Authenticate and bind a client to the Google Sheets service.
    #[instrument(name = "Authenticating to Google Sheets", skip_all)]
    pub async fn connect(config: &GoogleConfig) -> Result<Self> {
        let api = HubApi::new(config).await?;
        let client = Self::bind(api, config.subject()).with_call_timeout(config.call_timeout());

        Ok(client)
    }
}

impl<A: SheetsApi> SpreadsheetClient<A> {
    pub fn bind(api: A, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        info!(service = api.base_url(), subject = %subject, "Bound Sheets client");

        Self {
            api,
            subject,
            retry: RetryPolicy::default(),
            call_timeout: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Deadline applied to each remote call separately.
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn call<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| AppError::Timeout(limit))?,
            None => fut.await,
        }
    }

    /// Overwrite `range` with `values`, or append them below the data already
    /// in it.
    ///
    /// Overwrites store values as-is; appends are parsed as user input.
    /// `major_dimension` ("rows" or "columns") is case-insensitive. Quota
    /// errors are retried according to the client's [`RetryPolicy`]; any
    /// other error is returned immediately.
    #[instrument(name = "Writing range", skip(self, major_dimension, values))]
    pub async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major_dimension: &str,
        values: &[Vec<CellValue>],
        overwrite: bool,
    ) -> Result<WriteResponse> {
        let value_range = ValueRange {
            major_dimension: Some(major_dimension.to_uppercase()),
            range: None,
            values: Some(values::to_json_grid(values)),
        };

        info!(
            spreadsheet_id,
            range,
            rows = values.len(),
            overwrite,
            "Spreadsheet write request"
        );

        let mut retry = 0;
        loop {
            let result = match overwrite {
                true => self
                    .call(self.api.values_update(
                        spreadsheet_id,
                        range,
                        value_range.clone(),
                        ValueInputOption::Raw,
                    ))
                    .await
                    .map(WriteResponse::Updated),
                false => self
                    .call(self.api.values_append(
                        spreadsheet_id,
                        range,
                        value_range.clone(),
                        ValueInputOption::UserEntered,
                    ))
                    .await
                    .map(WriteResponse::Appended),
            };

            match result {
                Ok(response) => {
                    if !overwrite {
                        info!("Spreadsheet append was successful");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_quota_exceeded() => {
                    let Some(delay) = self.retry.delay_for(retry) else {
                        return Err(e);
                    };
                    retry += 1;
                    warn!(retry, ?delay, error = %e, "Quota exceeded, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Create a spreadsheet with one default tab.
    #[instrument(name = "Creating spreadsheet", skip(self))]
    pub async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet> {
        let spreadsheet = Spreadsheet {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self.call(self.api.create(spreadsheet)).await?;
        info!(
            spreadsheet_id = created.spreadsheet_id.as_deref().unwrap_or_default(),
            url = created.spreadsheet_url.as_deref().unwrap_or_default(),
            "Created spreadsheet"
        );

        Ok(created)
    }

    /// Fetch spreadsheet metadata and tabs, without cell data.
    pub async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        self.call(self.api.get(spreadsheet_id)).await
    }

    #[instrument(name = "Renaming spreadsheet", skip(self))]
    pub async fn rename_spreadsheet(
        &self,
        spreadsheet_id: &str,
        new_title: &str,
    ) -> Result<Spreadsheet> {
        let batch_update = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![requests::rename_spreadsheet(new_title)]),
            include_spreadsheet_in_response: Some(true),
            response_include_grid_data: Some(false),
            ..Default::default()
        };

        let response = self
            .call(self.api.batch_update(spreadsheet_id, batch_update))
            .await?;

        let updated = response.updated_spreadsheet.ok_or_else(|| {
            AppError::Sheets("Rename response did not include the spreadsheet".to_string())
        })?;

        info!(
            spreadsheet_id,
            title = updated
                .properties
                .as_ref()
                .and_then(|p| p.title.as_deref())
                .unwrap_or_default(),
            "Renamed spreadsheet"
        );

        Ok(updated)
    }

    #[instrument(name = "Inserting tab", skip(self))]
    pub async fn insert_tab(
        &self,
        spreadsheet_id: &str,
        name: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.execute_batch_update(spreadsheet_id, vec![requests::add_sheet(name)])
            .await
    }

    pub async fn rename_tab_by_name(
        &self,
        spreadsheet: &Spreadsheet,
        old_name: &str,
        new_name: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let spreadsheet_id = tabs::spreadsheet_id(spreadsheet)?;
        let tab_id = tabs::tab_id(spreadsheet, old_name)?;

        self.rename_tab_by_id(spreadsheet_id, new_name, tab_id)
            .await
    }

    #[instrument(name = "Renaming tab", skip(self))]
    pub async fn rename_tab_by_id(
        &self,
        spreadsheet_id: &str,
        new_name: &str,
        tab_id: i32,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.execute_batch_update(spreadsheet_id, vec![requests::rename_sheet(tab_id, new_name)])
            .await
    }

    #[instrument(name = "Deleting tab", skip(self))]
    pub async fn delete_tab_by_id(
        &self,
        spreadsheet_id: &str,
        tab_id: i32,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.execute_batch_update(spreadsheet_id, vec![requests::delete_sheet(tab_id)])
            .await
    }

    pub async fn delete_tab_by_name(
        &self,
        spreadsheet: &Spreadsheet,
        name: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let spreadsheet_id = tabs::spreadsheet_id(spreadsheet)?;
        let tab_id = tabs::tab_id(spreadsheet, name)?;

        self.delete_tab_by_id(spreadsheet_id, tab_id).await
    }

    /// Send `requests` as one atomic batch, in order, without inspecting them.
    pub async fn execute_batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let batch_update = BatchUpdateSpreadsheetRequest {
            requests: Some(requests),
            ..Default::default()
        };

        self.call(self.api.batch_update(spreadsheet_id, batch_update))
            .await
    }

    #[instrument(name = "Reading range", skip(self))]
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        let response = self.call(self.api.values_get(spreadsheet_id, range)).await?;

        Ok(values::from_json_grid(response.values.unwrap_or_default()))
    }

    /// Every cell in `range`, row by row.
    pub async fn get_column_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<CellValue>> {
        let grid = self.get_values(spreadsheet_id, range).await?;

        Ok(values::flatten(grid))
    }

    pub async fn get_column_values_as_string(
        &self,
        spreadsheet_id: &str,
        range: &str,
        to_lower: bool,
    ) -> Result<Vec<String>> {
        let cells = self.get_column_values(spreadsheet_id, range).await?;

        values::to_strings(cells, to_lower)
    }

    pub async fn get_column_values_as_string_set(
        &self,
        spreadsheet_id: &str,
        range: &str,
        to_lower: bool,
    ) -> Result<HashSet<String>> {
        let strings = self
            .get_column_values_as_string(spreadsheet_id, range, to_lower)
            .await?;

        Ok(values::to_string_set(strings))
    }

    #[instrument(name = "Clearing range", skip(self))]
    pub async fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse> {
        let response = self.call(self.api.values_clear(spreadsheet_id, range)).await?;
        info!(
            cleared_range = response.cleared_range.as_deref().unwrap_or(range),
            "Cleared range"
        );

        Ok(response)
    }
}
