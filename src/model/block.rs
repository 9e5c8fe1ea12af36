use super::blocks::*;
use crate::types::{BlockId, ResourceToken};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Block type codes as they appear in the docx API's `block_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Page,
    Text,
    /// Heading levels 1 through 9
    Heading(u8),
    Bullet,
    Ordered,
    Code,
    Image,
    Sheet,
    Table,
    Board,
    Unknown(i64),
}

impl BlockType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Page,
            2 => Self::Text,
            3..=11 => Self::Heading((code - 2) as u8),
            12 => Self::Bullet,
            13 => Self::Ordered,
            14 => Self::Code,
            27 => Self::Image,
            30 => Self::Sheet,
            31 => Self::Table,
            43 => Self::Board,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Page => 1,
            Self::Text => 2,
            Self::Heading(level) => i64::from(*level) + 2,
            Self::Bullet => 12,
            Self::Ordered => 13,
            Self::Code => 14,
            Self::Image => 27,
            Self::Sheet => 30,
            Self::Table => 31,
            Self::Board => 43,
            Self::Unknown(code) => *code,
        }
    }

    /// Name of the JSON key holding this type's payload.
    pub fn payload_key(&self) -> Option<String> {
        let key = match self {
            Self::Page => "page",
            Self::Text => "text",
            Self::Heading(level) => return Some(format!("heading{}", level)),
            Self::Bullet => "bullet",
            Self::Ordered => "ordered",
            Self::Code => "code",
            Self::Image => "image",
            Self::Sheet => "sheet",
            Self::Table => "table",
            Self::Board => "board",
            Self::Unknown(_) => return None,
        };
        Some(key.to_string())
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload_key() {
            Some(key) => write!(f, "{}", key),
            None => write!(f, "unknown({})", self.code()),
        }
    }
}

/// Typed payload of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Page(TextBlockContent),
    Text(TextBlockContent),
    Heading { level: u8, content: TextBlockContent },
    Bullet(TextBlockContent),
    Ordered(TextBlockContent),
    Code(CodeBlockContent),
    Image(ImageBlockContent),
    Sheet(EmbedBlockContent),
    Table(TableBlockContent),
    Board(EmbedBlockContent),
    /// Unknown type code, or a known code whose payload is missing.
    Unrecognized,
}

/// One node of the document's content tree, flattened.
///
/// Hierarchy survives only as `parent_id`/`children` references; the
/// rendering order is the order blocks were fetched in.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub parent_id: Option<BlockId>,
    pub children: Vec<BlockId>,
    pub block_type: BlockType,
    pub kind: BlockKind,
    /// The block exactly as the API returned it
    pub raw: Value,
}

impl Block {
    /// Builds a block from its raw JSON object.
    ///
    /// Decoding is lenient: a payload that does not match its declared
    /// shape degrades to an empty payload rather than failing the document.
    pub fn from_raw(id: BlockId, raw: Value) -> Self {
        let block_type = BlockType::from_code(raw.get("block_type").and_then(Value::as_i64).unwrap_or(0));

        let parent_id = raw
            .get("parent_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| BlockId::from_raw(s.to_string()));

        let children = raw
            .get("children")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(|s| BlockId::from_raw(s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let kind = decode_kind(&id, block_type, &raw);

        Self {
            id,
            parent_id,
            children,
            block_type,
            kind,
            raw,
        }
    }

    /// Resource token carried by image, sheet and board blocks.
    pub fn resource_token(&self) -> Option<ResourceToken> {
        match &self.kind {
            BlockKind::Image(image) => image.token(),
            BlockKind::Sheet(embed) | BlockKind::Board(embed) => embed.token(),
            _ => None,
        }
    }
}

fn decode_kind(id: &BlockId, block_type: BlockType, raw: &Value) -> BlockKind {
    let Some(payload) = block_type.payload_key().and_then(|key| raw.get(&key)) else {
        return BlockKind::Unrecognized;
    };

    match block_type {
        BlockType::Page => BlockKind::Page(lenient(id, payload)),
        BlockType::Text => BlockKind::Text(lenient(id, payload)),
        BlockType::Heading(level) => BlockKind::Heading {
            level,
            content: lenient(id, payload),
        },
        BlockType::Bullet => BlockKind::Bullet(lenient(id, payload)),
        BlockType::Ordered => BlockKind::Ordered(lenient(id, payload)),
        BlockType::Code => BlockKind::Code(lenient(id, payload)),
        BlockType::Image => BlockKind::Image(lenient(id, payload)),
        BlockType::Sheet => BlockKind::Sheet(lenient(id, payload)),
        BlockType::Table => BlockKind::Table(lenient(id, payload)),
        BlockType::Board => BlockKind::Board(lenient(id, payload)),
        BlockType::Unknown(_) => BlockKind::Unrecognized,
    }
}

fn lenient<T: DeserializeOwned + Default>(id: &BlockId, payload: &Value) -> T {
    serde_json::from_value(payload.clone()).unwrap_or_else(|e| {
        log::debug!("Block {} has an unexpected payload shape: {}", id, e);
        T::default()
    })
}
