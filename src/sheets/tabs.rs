use crate::error::{AppError, Result};
use google_sheets4::api::{Sheet, Spreadsheet};
use tracing::warn;

/// First tab whose title matches `name` exactly.
pub fn find_tab<'a>(spreadsheet: &'a Spreadsheet, name: &str) -> Option<&'a Sheet> {
    let found = spreadsheet.sheets.as_deref().unwrap_or_default().iter().find(|sheet| {
        sheet
            .properties
            .as_ref()
            .map(|props| props.title.as_deref() == Some(name))
            .unwrap_or(false)
    });

    if found.is_none() {
        warn!(
            tab = name,
            spreadsheet_id = spreadsheet.spreadsheet_id.as_deref().unwrap_or_default(),
            "Tab not found"
        );
    }

    found
}

/// ID of the first tab titled `name`.
pub fn tab_id(spreadsheet: &Spreadsheet, name: &str) -> Result<i32> {
    let spreadsheet_id = spreadsheet.spreadsheet_id.clone().unwrap_or_default();
    let Some(sheet) = find_tab(spreadsheet, name) else {
        return Err(AppError::TabNotFound {
            name: name.to_string(),
            spreadsheet_id,
        });
    };

    sheet
        .properties
        .as_ref()
        .and_then(|props| props.sheet_id)
        .ok_or_else(|| {
            warn!(tab = name, spreadsheet_id = %spreadsheet_id, "Tab has no sheet ID");
            AppError::Sheets(format!(
                "Tab '{}' in spreadsheet {} has no sheet ID",
                name, spreadsheet_id
            ))
        })
}

/// ID of a spreadsheet fetched from the service.
pub fn spreadsheet_id(spreadsheet: &Spreadsheet) -> Result<&str> {
    spreadsheet
        .spreadsheet_id
        .as_deref()
        .ok_or_else(|| AppError::Sheets("Spreadsheet has no ID".to_string()))
}
