// src/api/types.rs
//! Type definitions for the Lark API module.

use serde::Deserialize;
use serde_json::Value;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub page_token: Option<String>,
}

/// Everything a pagination run produced.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}

/// `data` of a docx blocks listing. Items stay raw JSON until the
/// fetcher has deduplicated them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlocksPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
}

impl From<BlocksPage> for PaginatedResponse<Value> {
    fn from(page: BlocksPage) -> Self {
        Self {
            items: page.items,
            has_more: page.has_more,
            page_token: page.page_token,
        }
    }
}

/// A presigned, short-lived download URL for one drive file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmpDownloadUrl {
    #[serde(default)]
    pub file_token: String,
    #[serde(default)]
    pub tmp_download_url: String,
}

/// Raw bytes of a downloaded file together with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Title and dimensions of one sheet inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetMetadata {
    pub title: Option<String>,
    pub row_count: u32,
    pub column_count: u32,
}

/// Which generation of the sheets values endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuesApi {
    V2,
    /// Used when the v2 endpoint does not know the spreadsheet
    V3,
}
