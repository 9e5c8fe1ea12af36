// src/formatting/block_renderer.rs
//! Block rendering: one text fragment per block, in document order.
//!
//! Rendering is pure. Media has already been resolved; each embed looks
//! up its token in the [`MediaResolution`] and falls back to a bracketed
//! placeholder when nothing usable was resolved.

use crate::media::{EmptySheetKind, MediaResolution, ResolvedMedia};
use crate::model::blocks::{CodeBlockContent, TableBlockContent, TextBlockContent};
use crate::model::{Block, BlockKind};
use crate::types::{MediaBaseUrl, ResourceToken};
use indexmap::IndexMap;

/// Context passed through the rendering pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Public prefix under which stored media files are served
    pub media_base_url: &'a MediaBaseUrl,
}

/// Renders every block to a fragment. The output has exactly one entry
/// per input block; blocks with nothing to show yield an empty string.
pub fn render_blocks(blocks: &[Block], media: &MediaResolution, ctx: &RenderContext) -> Vec<String> {
    let board_numbers = number_boards(blocks);
    let mut next_tokenless_board = board_numbers.len();
    let mut image_counter = 0usize;

    log::debug!("Rendering {} blocks", blocks.len());

    blocks
        .iter()
        .map(|block| match &block.kind {
            BlockKind::Page(content) | BlockKind::Text(content) => content.plain_text(),
            BlockKind::Heading { level, content } => {
                prefixed(&"#".repeat(usize::from(*level)), content)
            }
            BlockKind::Bullet(content) => prefixed("-", content),
            BlockKind::Ordered(content) => prefixed("1.", content),
            BlockKind::Code(code) => render_code(code),
            BlockKind::Table(table) => render_table(table),
            BlockKind::Image(image) => match image.token() {
                Some(token) => {
                    image_counter += 1;
                    render_image(image_counter, &token, media, ctx)
                }
                None => String::new(),
            },
            BlockKind::Sheet(embed) => match embed.token() {
                Some(token) => render_sheet(&token, media),
                None => "[SHEET]".to_string(),
            },
            BlockKind::Board(embed) => match embed.token() {
                Some(token) => {
                    let number = board_numbers.get(&token).copied().unwrap_or_default();
                    render_board(number, &token, media, ctx)
                }
                None => {
                    next_tokenless_board += 1;
                    format!("**Board {}:**\n[BOARD - No token]", next_tokenless_board)
                }
            },
            BlockKind::Unrecognized => String::new(),
        })
        .collect()
}

/// Board numbers, one per distinct token, in first-seen order starting at 1.
fn number_boards(blocks: &[Block]) -> IndexMap<ResourceToken, usize> {
    let mut numbers = IndexMap::new();
    for block in blocks {
        if let BlockKind::Board(embed) = &block.kind {
            if let Some(token) = embed.token() {
                let next = numbers.len() + 1;
                numbers.entry(token).or_insert(next);
            }
        }
    }
    numbers
}

fn prefixed(marker: &str, content: &TextBlockContent) -> String {
    let text = content.plain_text();
    if text.is_empty() {
        text
    } else {
        format!("{} {}", marker, text)
    }
}

fn render_code(code: &CodeBlockContent) -> String {
    let text = code.plain_text();
    if text.is_empty() {
        return text;
    }
    format!("```{}\n{}\n```", code.language_tag(), text)
}

fn render_table(table: &TableBlockContent) -> String {
    format!(
        "[TABLE: {}x{} cells]",
        table.property.row_size, table.property.column_size
    )
}

fn render_image(
    number: usize,
    token: &ResourceToken,
    media: &MediaResolution,
    ctx: &RenderContext,
) -> String {
    if let Some(stored) = media.stored_image(token) {
        return format!("[Image{}]({})", number, ctx.media_base_url.file_url(&stored.filename));
    }
    if let Some(url) = media.remote_image_url(token) {
        return format!("[Image{}]({})", number, url);
    }
    log::warn!("Image token {} has no resolved URL", token.preview());
    format!("[Image{}](IMAGE_TOKEN:{})", number, token)
}

/// The text a sheet embed renders as.
pub fn render_sheet(token: &ResourceToken, media: &MediaResolution) -> String {
    match media.sheets.get(token) {
        Some(ResolvedMedia::Table(table)) => table.to_string(),
        Some(ResolvedMedia::EmptySheet {
            title,
            reason: EmptySheetKind::NoCells,
        }) => format!("[SHEET: {} - Empty]", title),
        Some(ResolvedMedia::EmptySheet {
            title,
            reason: EmptySheetKind::NoValues,
        }) => format!("[SHEET: {} - No data]", title),
        Some(ResolvedMedia::Unresolved { reason }) => {
            format!("[SHEET_TOKEN:{} - Error: {}]", token, reason)
        }
        _ => format!("[SHEET_TOKEN:{}]", token),
    }
}

fn render_board(
    number: usize,
    token: &ResourceToken,
    media: &MediaResolution,
    ctx: &RenderContext,
) -> String {
    let mut parts = vec![format!("**Board {}:**\n", number)];

    let (description, snapshot) = match media.boards.get(token) {
        Some(ResolvedMedia::Diagram {
            description,
            snapshot,
        }) => (description.as_deref(), snapshot.as_ref()),
        _ => (None, None),
    };

    if let Some(description) = description {
        parts.push(description.to_string());
    }
    match snapshot {
        Some(stored) => parts.push(format!(
            "\n![Board {} Diagram]({})",
            number,
            ctx.media_base_url.file_url(&stored.filename)
        )),
        None if description.is_none() => {
            parts.push(format!("[BOARD_TOKEN:{} - Unable to fetch]", token))
        }
        None => {}
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ImageFormat, SheetTable, StoredMedia};
    use crate::types::BlockId;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn blocks(raw: Vec<Value>) -> Vec<Block> {
        raw.into_iter()
            .enumerate()
            .map(|(i, v)| Block::from_raw(BlockId::from_raw(format!("b{}", i)), v))
            .collect()
    }

    fn text(content: &str) -> Value {
        json!({"elements": [{"text_run": {"content": content}}]})
    }

    fn token(s: &str) -> ResourceToken {
        ResourceToken::new(s).unwrap()
    }

    fn stored(filename: &str, format: ImageFormat) -> StoredMedia {
        StoredMedia {
            filename: filename.to_string(),
            format,
            path: PathBuf::from(filename),
        }
    }

    fn render(raw: Vec<Value>, media: &MediaResolution) -> Vec<String> {
        let base = MediaBaseUrl::default();
        render_blocks(&blocks(raw), media, &RenderContext { media_base_url: &base })
    }

    #[test]
    fn test_text_blocks() {
        let out = render(
            vec![
                json!({"block_type": 1, "page": text("Report")}),
                json!({"block_type": 5, "heading3": text("Deep")}),
                json!({"block_type": 3, "heading1": text("")}),
                json!({"block_type": 12, "bullet": text("item")}),
                json!({"block_type": 13, "ordered": text("step")}),
                json!({"block_type": 13, "ordered": text("")}),
                json!({"block_type": 31, "table": {"property": {"row_size": 3, "column_size": 4}}}),
                json!({"block_type": 999}),
            ],
            &MediaResolution::default(),
        );
        assert_eq!(
            out,
            vec!["Report", "### Deep", "", "- item", "1. step", "", "[TABLE: 3x4 cells]", ""]
        );
    }

    #[test]
    fn test_code_block() {
        let out = render(
            vec![
                json!({"block_type": 14, "code": {"elements": [{"text_run": {"content": "let x = 1;"}}], "style": {"language": "rust"}}}),
                json!({"block_type": 14, "code": {"elements": []}}),
            ],
            &MediaResolution::default(),
        );
        assert_eq!(out, vec!["```rust\nlet x = 1;\n```", ""]);
    }

    #[test]
    fn test_image_fallback_chain() {
        let mut media = MediaResolution::default();
        media.images.insert(
            token("a"),
            ResolvedMedia::LocalFile(stored("f00d.png", ImageFormat::Png)),
        );
        media
            .image_urls
            .insert(token("b"), "https://cdn.example/b".to_string());
        media.image_urls.insert(token("c"), "ftp://nope".to_string());

        let out = render(
            vec![
                json!({"block_type": 27, "image": {"token": "a"}}),
                json!({"block_type": 27, "image": {}}),
                json!({"block_type": 27, "image": {"token": "b"}}),
                json!({"block_type": 27, "image": {"token": "c"}}),
            ],
            &media,
        );
        assert_eq!(
            out,
            vec![
                "[Image1](http://localhost:48080/static/f00d.png)",
                "",
                "[Image2](https://cdn.example/b)",
                "[Image3](IMAGE_TOKEN:c)",
            ]
        );
    }

    #[test]
    fn test_sheet_variants() {
        let mut media = MediaResolution::default();
        media.sheets.insert(
            token("s_1"),
            ResolvedMedia::Table(SheetTable::new("T", 1, &[vec![json!("x")]])),
        );
        media.sheets.insert(
            token("s_2"),
            ResolvedMedia::EmptySheet {
                title: "Blank".to_string(),
                reason: EmptySheetKind::NoCells,
            },
        );
        media.sheets.insert(
            token("s_3"),
            ResolvedMedia::Unresolved {
                reason: "API error: boom".to_string(),
            },
        );

        let out = render(
            vec![
                json!({"block_type": 30, "sheet": {"token": "s_1"}}),
                json!({"block_type": 30, "sheet": {"token": "s_2"}}),
                json!({"block_type": 30, "sheet": {"token": "s_3"}}),
                json!({"block_type": 30, "sheet": {"token": "raw"}}),
                json!({"block_type": 30, "sheet": {}}),
            ],
            &media,
        );
        assert_eq!(
            out,
            vec![
                "**Sheet: T**\n\n| x |\n| --- |",
                "[SHEET: Blank - Empty]",
                "[SHEET_TOKEN:s_3 - Error: API error: boom]",
                "[SHEET_TOKEN:raw]",
                "[SHEET]",
            ]
        );
    }

    #[test]
    fn test_board_numbering_is_per_distinct_token() {
        let mut media = MediaResolution::default();
        media.boards.insert(
            token("b1"),
            ResolvedMedia::Diagram {
                description: Some("[BOARD: Empty]".to_string()),
                snapshot: Some(stored("cafe.png", ImageFormat::Png)),
            },
        );
        media.boards.insert(
            token("b2"),
            ResolvedMedia::Unresolved {
                reason: "down".to_string(),
            },
        );

        let out = render(
            vec![
                json!({"block_type": 43, "board": {"token": "b1"}}),
                json!({"block_type": 43, "board": {}}),
                json!({"block_type": 43, "board": {"token": "b2"}}),
                json!({"block_type": 43, "board": {"token": "b1"}}),
            ],
            &media,
        );

        let first = "**Board 1:**\n\n[BOARD: Empty]\n\n![Board 1 Diagram](http://localhost:48080/static/cafe.png)";
        assert_eq!(out[0], first);
        assert_eq!(out[1], "**Board 3:**\n[BOARD - No token]");
        assert_eq!(out[2], "**Board 2:**\n\n[BOARD_TOKEN:b2 - Unable to fetch]");
        assert_eq!(out[3], first);
    }

    #[test]
    fn test_board_snapshot_only() {
        let mut media = MediaResolution::default();
        media.boards.insert(
            token("b"),
            ResolvedMedia::Diagram {
                description: None,
                snapshot: Some(stored("beef.png", ImageFormat::Png)),
            },
        );
        let out = render(vec![json!({"block_type": 43, "board": {"token": "b"}})], &media);
        assert_eq!(
            out,
            vec!["**Board 1:**\n\n\n![Board 1 Diagram](http://localhost:48080/static/beef.png)"]
        );
    }
}
