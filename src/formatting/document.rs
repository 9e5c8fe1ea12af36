// src/formatting/document.rs
//! Document assembly: fragments joined into the final content, plus the
//! raw diagnostics of how each token was resolved.

use super::block_renderer::{render_blocks, render_sheet, RenderContext};
use crate::constants::{BLOCK_SEPARATOR, CHARS_PER_BLOCK_ESTIMATE};
use crate::media::{MediaResolution, MediaTokens, ResolvedMedia};
use crate::model::Block;
use crate::types::DocumentId;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A fully reconstructed document.
#[derive(Debug, Clone)]
pub struct Document {
    pub document_id: DocumentId,
    /// The URL the document was requested by
    pub url: String,
    pub content: String,
    /// One fragment per block, empty ones included
    pub fragments: Vec<String>,
    pub blocks: Vec<Block>,
    pub raw_content: RawContent,
}

/// Diagnostic view of the fetch, keyed by resource token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawContent {
    pub blocks: Vec<Value>,
    pub image_urls: IndexMap<String, String>,
    pub image_filename_map: IndexMap<String, String>,
    pub sheet_contents: IndexMap<String, String>,
    pub board_contents: IndexMap<String, String>,
    pub board_filename_map: IndexMap<String, String>,
    /// Every board token in encounter order, duplicates included
    pub board_tokens: Vec<String>,
}

impl RawContent {
    fn new(blocks: &[Block], tokens: &MediaTokens, media: &MediaResolution) -> Self {
        let image_filename_map = media
            .images
            .keys()
            .filter_map(|token| {
                media
                    .stored_image(token)
                    .map(|stored| (token.to_string(), stored.filename.clone()))
            })
            .collect();

        let sheet_contents = media
            .sheets
            .keys()
            .map(|token| (token.to_string(), render_sheet(token, media)))
            .collect();

        let mut board_contents = IndexMap::new();
        let mut board_filename_map = IndexMap::new();
        for (token, resolved) in &media.boards {
            if let ResolvedMedia::Diagram {
                description,
                snapshot,
            } = resolved
            {
                if let Some(description) = description {
                    board_contents.insert(token.to_string(), description.clone());
                }
                if let Some(stored) = snapshot {
                    board_filename_map.insert(token.to_string(), stored.filename.clone());
                }
            }
        }

        Self {
            blocks: blocks.iter().map(|b| b.raw.clone()).collect(),
            image_urls: media
                .image_urls
                .iter()
                .map(|(token, url)| (token.to_string(), url.clone()))
                .collect(),
            image_filename_map,
            sheet_contents,
            board_contents,
            board_filename_map,
            board_tokens: tokens.boards.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Joins the non-empty fragments with a blank line between them.
pub fn join_fragments(fragments: &[String]) -> String {
    let mut output = String::with_capacity(fragments.len() * CHARS_PER_BLOCK_ESTIMATE);
    for fragment in fragments.iter().filter(|f| !f.is_empty()) {
        if !output.is_empty() {
            output.push_str(BLOCK_SEPARATOR);
        }
        output.push_str(fragment);
    }
    output
}

/// Renders the blocks and assembles the document.
pub fn assemble_document(
    document_id: DocumentId,
    url: &str,
    blocks: Vec<Block>,
    tokens: &MediaTokens,
    media: &MediaResolution,
    ctx: &RenderContext,
) -> Document {
    let fragments = render_blocks(&blocks, media, ctx);
    let content = join_fragments(&fragments);
    let raw_content = RawContent::new(&blocks, tokens, media);

    log::info!(
        "Assembled document {}: {} blocks, {} characters",
        document_id,
        blocks.len(),
        content.len()
    );

    Document {
        document_id,
        url: url.to_string(),
        content,
        fragments,
        blocks,
        raw_content,
    }
}
