//! Convenience helpers over the Google Sheets v4 API.
//!
//! [`SpreadsheetClient`] wraps a [`SheetsApi`] backend (normally [`HubApi`])
//! and exposes range reads and writes, tab management and spreadsheet
//! lifecycle calls with typed cell values and typed errors.

pub mod config;
pub mod error;
pub mod retry;
pub mod sheets;
pub mod values;

pub use error::{AppError, Result};
pub use sheets::{HubApi, SheetsApi, SpreadsheetClient, WriteResponse};
pub use values::{CellValue, Grid};
