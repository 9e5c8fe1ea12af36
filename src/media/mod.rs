// src/media/mod.rs
//! Embedded media resolution: images, spreadsheets and whiteboards.
//!
//! Everything here is best-effort. A token that cannot be resolved is
//! logged and recorded as [`ResolvedMedia::Unresolved`] (or left out);
//! it never fails the document.

mod boards;
mod images;
mod resolver;
mod sheets;
mod store;
mod tokens;

use crate::error::AppError;
use crate::types::ResourceToken;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

pub use boards::describe_board;
pub use images::{sniff_format, ImageFormat};
pub use resolver::{MediaResolver, ResolveOptions};
pub use sheets::{cell_text, column_letters, split_sheet_token, SheetTable};
pub use store::{MediaStore, StoredMedia};
pub use tokens::{extract_tokens, MediaTokens};

/// Why a single media token could not be resolved.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error(transparent)]
    Api(#[from] AppError),

    #[error("no download URL returned")]
    NoDownloadUrl,

    #[error("downloaded file is empty")]
    EmptyBody,

    #[error("could not store media: {0}")]
    Storage(#[from] std::io::Error),
}

/// Why a sheet rendered without a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySheetKind {
    /// Metadata reports zero rows or zero columns
    NoCells,
    /// The values endpoint returned no rows
    NoValues,
}

/// Outcome of resolving one distinct token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedMedia {
    LocalFile(StoredMedia),
    Table(SheetTable),
    EmptySheet {
        title: String,
        reason: EmptySheetKind,
    },
    Diagram {
        description: Option<String>,
        snapshot: Option<StoredMedia>,
    },
    Unresolved {
        reason: String,
    },
}

/// Per-token resolution results of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaResolution {
    /// Presigned URLs obtained for image tokens
    pub image_urls: IndexMap<ResourceToken, String>,
    pub images: IndexMap<ResourceToken, ResolvedMedia>,
    pub sheets: IndexMap<ResourceToken, ResolvedMedia>,
    pub boards: IndexMap<ResourceToken, ResolvedMedia>,
}

impl MediaResolution {
    pub fn stored_image(&self, token: &ResourceToken) -> Option<&StoredMedia> {
        match self.images.get(token) {
            Some(ResolvedMedia::LocalFile(stored)) => Some(stored),
            _ => None,
        }
    }

    /// The presigned URL of an image, if it looks like one.
    pub fn remote_image_url(&self, token: &ResourceToken) -> Option<&str> {
        self.image_urls
            .get(token)
            .map(String::as_str)
            .filter(|url| url.starts_with("http"))
    }
}
