// src/api/responses.rs
//! Wire shapes of the Lark Open API responses.
//!
//! Every response is wrapped in the `{code, msg, data}` envelope. The
//! shapes here decode the parts this crate reads and default the rest.

use super::types::{SheetMetadata, TmpDownloadUrl};
use serde::Deserialize;
use serde_json::Value;

/// The common response envelope. `code == 0` means success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TmpDownloadUrlsData {
    #[serde(default)]
    pub tmp_download_urls: Vec<TmpDownloadUrl>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub sheet: SheetInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct SheetInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

impl From<SheetData> for SheetMetadata {
    fn from(data: SheetData) -> Self {
        SheetMetadata {
            title: data.sheet.title.filter(|t| !t.is_empty()),
            row_count: data.sheet.grid_properties.row_count,
            column_count: data.sheet.grid_properties.column_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardNodesData {
    #[serde(default)]
    pub nodes: Vec<Value>,
}

/// Locates the cell matrix of a values response.
///
/// The two endpoint generations disagree on where the rows live:
/// `data.valueRange.values`, `data.values`, or a top-level `values`.
pub fn extract_value_rows(body: &Value) -> Vec<Vec<Value>> {
    let rows = body
        .pointer("/data/valueRange/values")
        .or_else(|| body.pointer("/data/values"))
        .or_else(|| body.get("values"))
        .and_then(Value::as_array);

    rows.map(|rows| {
        rows.iter()
            .map(|row| match row {
                Value::Array(cells) => cells.clone(),
                Value::Null => Vec::new(),
                single => vec![single.clone()],
            })
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_rows_from_each_location() {
        let v2 = json!({"code": 0, "data": {"valueRange": {"range": "s!A1:B1", "values": [["a", 1]]}}});
        assert_eq!(extract_value_rows(&v2), vec![vec![json!("a"), json!(1)]]);

        let flat = json!({"code": 0, "data": {"values": [["x"]]}});
        assert_eq!(extract_value_rows(&flat), vec![vec![json!("x")]]);

        let top = json!({"values": [["y"]]});
        assert_eq!(extract_value_rows(&top), vec![vec![json!("y")]]);

        assert!(extract_value_rows(&json!({"code": 0, "data": {}})).is_empty());
    }

    #[test]
    fn test_sheet_metadata_blank_title() {
        let data: SheetData = serde_json::from_value(json!({
            "sheet": {"title": "", "grid_properties": {"row_count": 3, "column_count": 2}}
        }))
        .unwrap();
        let meta = SheetMetadata::from(data);
        assert_eq!(meta.title, None);
        assert_eq!((meta.row_count, meta.column_count), (3, 2));
    }
}
