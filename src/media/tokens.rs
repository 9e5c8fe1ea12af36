//! Discovery of the media tokens referenced by a document.

use crate::model::{Block, BlockKind};
use crate::types::ResourceToken;
use indexmap::IndexSet;

/// Resource tokens by class, in first-seen order. Duplicates are kept;
/// use the `distinct_*` views to resolve each token once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaTokens {
    pub images: Vec<ResourceToken>,
    pub sheets: Vec<ResourceToken>,
    pub boards: Vec<ResourceToken>,
}

impl MediaTokens {
    pub fn distinct_images(&self) -> Vec<ResourceToken> {
        distinct(&self.images)
    }

    pub fn distinct_sheets(&self) -> Vec<ResourceToken> {
        distinct(&self.sheets)
    }

    pub fn distinct_boards(&self) -> Vec<ResourceToken> {
        distinct(&self.boards)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.sheets.is_empty() && self.boards.is_empty()
    }
}

fn distinct(tokens: &[ResourceToken]) -> Vec<ResourceToken> {
    tokens
        .iter()
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Scans blocks for image, sheet and board tokens. Blocks without a
/// token, or with an empty one, contribute nothing.
pub fn extract_tokens(blocks: &[Block]) -> MediaTokens {
    let mut tokens = MediaTokens::default();
    for block in blocks {
        let Some(token) = block.resource_token() else {
            continue;
        };
        match block.kind {
            BlockKind::Image(_) => tokens.images.push(token),
            BlockKind::Sheet(_) => tokens.sheets.push(token),
            BlockKind::Board(_) => tokens.boards.push(token),
            _ => {}
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockId;
    use serde_json::{json, Value};

    fn blocks(raw: Vec<Value>) -> Vec<Block> {
        raw.into_iter()
            .enumerate()
            .map(|(i, v)| Block::from_raw(BlockId::from_raw(format!("b{}", i)), v))
            .collect()
    }

    fn token(s: &str) -> ResourceToken {
        ResourceToken::new(s).unwrap()
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let blocks = blocks(vec![
            json!({"block_type": 27, "image": {"token": "img2"}}),
            json!({"block_type": 2, "text": {"elements": []}}),
            json!({"block_type": 43, "board": {"token": "brd1"}}),
            json!({"block_type": 27, "image": {"token": "img1"}}),
            json!({"block_type": 27, "image": {"token": "img2"}}),
            json!({"block_type": 30, "sheet": {"token": "sht_1"}}),
            json!({"block_type": 27, "image": {"token": ""}}),
            json!({"block_type": 43, "board": {}}),
        ]);

        let tokens = extract_tokens(&blocks);
        assert_eq!(tokens.images, vec![token("img2"), token("img1"), token("img2")]);
        assert_eq!(tokens.distinct_images(), vec![token("img2"), token("img1")]);
        assert_eq!(tokens.sheets, vec![token("sht_1")]);
        assert_eq!(tokens.boards, vec![token("brd1")]);
    }

    #[test]
    fn test_type_code_without_payload_is_ignored() {
        let blocks = blocks(vec![json!({"block_type": 27, "text": {"elements": []}})]);
        assert!(extract_tokens(&blocks).is_empty());
    }
}
