use super::api::{SheetsApi, ValueInputOption};
use crate::config::GoogleConfig;
use crate::error::{AppError, QUOTA_EXCEEDED, Result};
use crate::sheets::auth::create_and_verify_authenticator;
use async_trait::async_trait;
use google_sheets4::api::{
    AppendValuesResponse, BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse,
    ClearValuesRequest, ClearValuesResponse, Scope, Sheets, Spreadsheet, UpdateValuesResponse,
    ValueRange,
};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;

// Read and write access to all of the user's spreadsheets
pub(crate) const AUTH_SCOPE: Scope = Scope::Spreadsheet;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

const TOO_MANY_REQUESTS: u16 = 429;
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// [`SheetsApi`] backed by the `google-sheets4` hub.
pub struct HubApi {
    hub: Sheets<HttpsConnector<HttpConnector>>,
    base_url: String,
}

impl HubApi {
    pub async fn new(config: &GoogleConfig) -> Result<Self> {
        let auth = create_and_verify_authenticator(config).await?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| AppError::Auth(format!("Failed to load native TLS roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);

        let mut hub = Sheets::new(client, auth);
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        hub.base_url(base_url.clone());

        Ok(Self { hub, base_url })
    }
}

/// Map a client error to a quota error or a plain Sheets error.
fn classify(context: &str, err: google_sheets4::Error) -> AppError {
    let rate_limited = match &err {
        google_sheets4::Error::BadRequest(body) => {
            body.pointer("/error/code").and_then(Value::as_u64) == Some(TOO_MANY_REQUESTS as u64)
                || body.pointer("/error/status").and_then(Value::as_str)
                    == Some(RESOURCE_EXHAUSTED)
        }
        google_sheets4::Error::Failure(response) => response.status().as_u16() == TOO_MANY_REQUESTS,
        _ => false,
    };

    let message = format!("{}: {}", context, err);
    match rate_limited || message.contains(QUOTA_EXCEEDED) {
        true => AppError::Quota(message),
        false => AppError::Sheets(message),
    }
}

#[async_trait]
impl SheetsApi for HubApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create(&self, spreadsheet: Spreadsheet) -> Result<Spreadsheet> {
        let (_, result) = self
            .hub
            .spreadsheets()
            .create(spreadsheet)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify("Failed to create spreadsheet", e))?;

        Ok(result)
    }

    async fn get(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(spreadsheet_id)
            .include_grid_data(false)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify("Failed to get spreadsheet", e))?;

        Ok(spreadsheet)
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let (_, response) = self
            .hub
            .spreadsheets()
            .batch_update(request, spreadsheet_id)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify("Failed to update spreadsheet", e))?;

        Ok(response)
    }

    async fn values_get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify(&format!("Failed to read range '{}'", range), e))?;

        Ok(response)
    }

    async fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_update(values, spreadsheet_id, range)
            .value_input_option(input.as_str())
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify(&format!("Failed to write range '{}'", range), e))?;

        Ok(response)
    }

    async fn values_append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse> {
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_append(values, spreadsheet_id, range)
            .value_input_option(input.as_str())
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify(&format!("Failed to append to range '{}'", range), e))?;

        Ok(response)
    }

    async fn values_clear(&self, spreadsheet_id: &str, range: &str) -> Result<ClearValuesResponse> {
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_clear(ClearValuesRequest::default(), spreadsheet_id, range)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| classify(&format!("Failed to clear range '{}'", range), e))?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_rate_limit_code() {
        let err = google_sheets4::Error::BadRequest(json!({
            "error": {
                "code": 429,
                "message": "Too many requests",
                "status": "RESOURCE_EXHAUSTED",
            }
        }));
        assert!(matches!(classify("Failed", err), AppError::Quota(_)));
    }

    #[test]
    fn test_classify_quota_message() {
        let err = google_sheets4::Error::BadRequest(json!({
            "error": {
                "message": "Quota exceeded for quota metric 'Write requests' of service 'sheets.googleapis.com'",
            }
        }));
        assert!(matches!(classify("Failed", err), AppError::Quota(_)));
    }

    #[test]
    fn test_classify_other_errors() {
        let err = google_sheets4::Error::BadRequest(json!({
            "error": {
                "code": 400,
                "message": "Unable to parse range: Nope!A1",
                "status": "INVALID_ARGUMENT",
            }
        }));
        match classify("Failed to read range 'Nope!A1'", err) {
            AppError::Sheets(message) => {
                assert!(message.starts_with("Failed to read range 'Nope!A1'"));
                assert!(message.contains("Unable to parse range"));
            }
            other => panic!("expected Sheets error, got {:?}", other),
        }
    }
}
