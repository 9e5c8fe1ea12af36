//! Embedded spreadsheet resolution and table rendering.

use super::{EmptySheetKind, MediaError, ResolvedMedia};
use crate::api::{LarkRepository, ValuesApi};
use crate::error::AppError;
use crate::types::ResourceToken;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Spreadsheet column name for a 1-based column number: 1 → A, 26 → Z,
/// 27 → AA, 703 → AAA.
pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Splits a `{spreadsheet}_{sheet}` embed token on its last underscore.
pub fn split_sheet_token(token: &str) -> Option<(&str, &str)> {
    token.rsplit_once('_')
}

/// Flattens one cell value to display text.
///
/// Rich cells arrive as arrays of segments (`{"type": "url", "text": ..}`
/// and the like); their `text` members are concatenated.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(segments) => segments.iter().map(segment_text).collect(),
        Value::Object(_) => segment_text(value),
    }
}

fn segment_text(segment: &Value) -> String {
    match segment {
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        other => cell_text(other),
    }
}

/// A sheet's values, normalised to exactly `column_count` cells per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetTable {
    pub title: String,
    pub column_count: usize,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(title: impl Into<String>, column_count: usize, values: &[Vec<Value>]) -> Self {
        let rows = values
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().take(column_count).map(cell_text).collect();
                cells.resize(column_count, String::new());
                cells
            })
            .collect();
        Self {
            title: title.into(),
            column_count,
            rows,
        }
    }
}

impl fmt::Display for SheetTable {
    /// Markdown table under a bold title; the first row doubles as header.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Sheet: {}**", self.title)?;
        for (i, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            write!(f, "\n| {} |", cells.join(" | "))?;
            if i == 0 {
                write!(f, "\n|{}|", vec![" --- "; self.column_count].join("|"))?;
            }
        }
        Ok(())
    }
}

/// Resolves one sheet embed token.
///
/// Returns `None` when the token cannot name a sheet; the renderer then
/// falls back to its raw-token placeholder.
pub async fn resolve_sheet<R>(repo: &R, token: &ResourceToken) -> Option<ResolvedMedia>
where
    R: LarkRepository + ?Sized,
{
    let Some((spreadsheet, sheet_id)) = split_sheet_token(token.as_str()) else {
        log::warn!("Invalid sheet token format: {}", token);
        return None;
    };

    match fetch_sheet(repo, spreadsheet, sheet_id).await {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            log::warn!("Failed to fetch sheet {}: {}", token.preview(), e);
            Some(ResolvedMedia::Unresolved {
                reason: e.to_string(),
            })
        }
    }
}

async fn fetch_sheet<R>(repo: &R, spreadsheet: &str, sheet_id: &str) -> Result<ResolvedMedia, MediaError>
where
    R: LarkRepository + ?Sized,
{
    let meta = repo.sheet_metadata(spreadsheet, sheet_id).await?;
    let title = meta.title.unwrap_or_else(|| sheet_id.to_string());

    if meta.row_count == 0 || meta.column_count == 0 {
        log::debug!(
            "Sheet {} has no cells ({} rows, {} columns)",
            sheet_id,
            meta.row_count,
            meta.column_count
        );
        return Ok(ResolvedMedia::EmptySheet {
            title,
            reason: EmptySheetKind::NoCells,
        });
    }

    let range = format!(
        "{}!A1:{}{}",
        sheet_id,
        column_letters(meta.column_count),
        meta.row_count
    );
    let values = fetch_values(repo, spreadsheet, &range).await?;
    if values.is_empty() {
        return Ok(ResolvedMedia::EmptySheet {
            title,
            reason: EmptySheetKind::NoValues,
        });
    }

    Ok(ResolvedMedia::Table(SheetTable::new(
        title,
        meta.column_count as usize,
        &values,
    )))
}

/// Reads a range through the v2 endpoint, retrying v3 when v2 answers 404.
async fn fetch_values<R>(repo: &R, spreadsheet: &str, range: &str) -> Result<Vec<Vec<Value>>, AppError>
where
    R: LarkRepository + ?Sized,
{
    match repo.sheet_values(spreadsheet, range, ValuesApi::V2).await {
        Err(AppError::Fetch(err)) if err.is_not_found() => {
            log::debug!("v2 values endpoint returned 404 for {}, trying v3", range);
            repo.sheet_values(spreadsheet, range, ValuesApi::V3).await
        }
        other => other,
    }
}
