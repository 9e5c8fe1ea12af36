// src/formatting/mod.rs
//! Renders document blocks into flattened markdown and assembles the result.

pub mod block_renderer;
mod document;

pub use block_renderer::{render_blocks, render_sheet, RenderContext};
pub use document::{assemble_document, join_fragments, Document, RawContent};
