use std::time::Duration;
use thiserror::Error;

/// Substring Google uses in rate-limit error bodies.
pub const QUOTA_EXCEEDED: &str = "Quota exceeded";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Google Sheets API error: {0}")]
    Sheets(String),

    #[error("Google Sheets quota error: {0}")]
    Quota(String),

    #[error("Tab '{name}' not found in spreadsheet {spreadsheet_id}")]
    TabNotFound {
        name: String,
        spreadsheet_id: String,
    },

    #[error("Cell {index} is {found}, expected a string")]
    CellType { index: usize, found: &'static str },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("OAuth2 authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the service rejected the call for rate-limit reasons.
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            AppError::Quota(_) => true,
            other => other.to_string().contains(QUOTA_EXCEEDED),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_variant_is_quota() {
        assert!(AppError::Quota("429".to_string()).is_quota_exceeded());
    }

    #[test]
    fn test_quota_detected_by_message() {
        let err = AppError::Sheets(
            "Failed to append values: Quota exceeded for quota metric 'Write requests'"
                .to_string(),
        );
        assert!(err.is_quota_exceeded());
    }

    #[test]
    fn test_other_errors_are_not_quota() {
        let err = AppError::Sheets("Requested entity was not found.".to_string());
        assert!(!err.is_quota_exceeded());

        let err = AppError::TabNotFound {
            name: "Sheet3".to_string(),
            spreadsheet_id: "abc".to_string(),
        };
        assert!(!err.is_quota_exceeded());
    }
}
