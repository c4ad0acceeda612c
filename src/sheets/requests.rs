use google_sheets4::FieldMask;
use google_sheets4::api::{
    AddSheetRequest, DeleteSheetRequest, Request, SheetProperties, SpreadsheetProperties,
    UpdateSheetPropertiesRequest, UpdateSpreadsheetPropertiesRequest,
};

/// Add a grid tab with the given title.
pub fn add_sheet(title: &str) -> Request {
    Request {
        add_sheet: Some(AddSheetRequest {
            properties: Some(SheetProperties {
                title: Some(title.to_string()),
                ..Default::default()
            }),
        }),
        ..Default::default()
    }
}

/// Retitle a tab, leaving its other properties untouched.
pub fn rename_sheet(sheet_id: i32, title: &str) -> Request {
    Request {
        update_sheet_properties: Some(UpdateSheetPropertiesRequest {
            properties: Some(SheetProperties {
                sheet_id: Some(sheet_id),
                title: Some(title.to_string()),
                ..Default::default()
            }),
            fields: Some(FieldMask::new(&["title"])),
        }),
        ..Default::default()
    }
}

pub fn delete_sheet(sheet_id: i32) -> Request {
    Request {
        delete_sheet: Some(DeleteSheetRequest {
            sheet_id: Some(sheet_id),
        }),
        ..Default::default()
    }
}

/// Retitle the spreadsheet itself.
pub fn rename_spreadsheet(title: &str) -> Request {
    Request {
        update_spreadsheet_properties: Some(UpdateSpreadsheetPropertiesRequest {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
                ..Default::default()
            }),
            fields: Some(FieldMask::new(&["title"])),
        }),
        ..Default::default()
    }
}
