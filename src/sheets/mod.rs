mod api;
mod auth;
mod client;
mod hub;
pub mod requests;
mod tabs;

pub use api::{SheetsApi, ValueInputOption};
pub use client::{SpreadsheetClient, WriteResponse};
pub use hub::{DEFAULT_BASE_URL, HubApi};
pub use tabs::{find_tab, tab_id};

// Re-export clear_tokens for CLI usage
pub use auth::clear_tokens as clear_sheets_tokens;
