// src/api/mod.rs
//! Lark Open API interaction: the ability to retrieve a document and the
//! media embedded in it.
//!
//! Business logic depends on [`LarkRepository`], never on HTTP details.

pub mod client;
mod pagination;
pub mod parser;
mod responses;
mod types;

use crate::error::AppError;
use crate::types::{DocumentId, ResourceToken};
use serde_json::Value;

pub use client::LarkHttpClient;
pub use pagination::{fetch_all_blocks, fetch_all_pages};
pub use types::{
    BlocksPage, DownloadedMedia, PaginatedResponse, PaginationResult, SheetMetadata,
    TmpDownloadUrl, ValuesApi,
};

/// The ability to read documents, drive media, sheets and whiteboards.
#[async_trait::async_trait]
pub trait LarkRepository: Send + Sync {
    /// One page of the document's flat block listing.
    async fn blocks_page(
        &self,
        document: &DocumentId,
        page_token: Option<&str>,
    ) -> Result<BlocksPage, AppError>;

    /// Presigned download URLs for one drive media token.
    async fn image_download_urls(
        &self,
        token: &ResourceToken,
    ) -> Result<Vec<TmpDownloadUrl>, AppError>;

    /// Unauthenticated download of a presigned URL.
    async fn download(&self, url: &str) -> Result<DownloadedMedia, AppError>;

    async fn sheet_metadata(
        &self,
        spreadsheet: &str,
        sheet_id: &str,
    ) -> Result<SheetMetadata, AppError>;

    /// Cell values for an A1 range such as `Sheet1!A1:C10`.
    async fn sheet_values(
        &self,
        spreadsheet: &str,
        range: &str,
        api: ValuesApi,
    ) -> Result<Vec<Vec<Value>>, AppError>;

    /// Raw node objects of a whiteboard.
    async fn board_nodes(&self, board: &ResourceToken) -> Result<Vec<Value>, AppError>;

    /// A rendered image of a whiteboard.
    async fn board_snapshot(&self, board: &ResourceToken) -> Result<DownloadedMedia, AppError>;
}
