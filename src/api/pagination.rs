// src/api/pagination.rs
//! Cursor pagination and the block fetcher built on it.

use super::types::{PaginatedResponse, PaginationResult};
use super::LarkRepository;
use crate::error::AppError;
use crate::model::Block;
use crate::types::{BlockId, DocumentId};
use indexmap::IndexMap;
use serde_json::Value;

/// Fetches pages strictly one after another until the listing is exhausted.
///
/// Stops when `has_more` is false or the next page token is absent or
/// empty. Any page failure aborts the whole run.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_fn: F) -> Result<PaginationResult<T>, AppError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_fn(cursor.take()).await?;
        pages_fetched += 1;

        let has_more = response.has_more;
        cursor = response.page_token.filter(|t| !t.is_empty());
        items.extend(response.items);

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        items,
        pages_fetched,
    })
}

/// Retrieves the complete, deduplicated block set of a document.
///
/// Blocks are keyed by `block_id`: a repeated id overwrites the earlier
/// entry but keeps its original position. Items without an id are dropped.
pub async fn fetch_all_blocks<R>(repo: &R, document: &DocumentId) -> Result<Vec<Block>, AppError>
where
    R: LarkRepository + ?Sized,
{
    let result = fetch_all_pages(|page_token| async move {
        let page = repo.blocks_page(document, page_token.as_deref()).await?;
        Ok(PaginatedResponse::from(page))
    })
    .await?;

    log::debug!(
        "Fetched {} raw blocks in {} page(s) for {}",
        result.items.len(),
        result.pages_fetched,
        document
    );

    let mut by_id: IndexMap<String, Value> = IndexMap::with_capacity(result.items.len());
    for item in result.items {
        let Some(id) = item
            .get("block_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        by_id.insert(id, item);
    }

    Ok(by_id
        .into_iter()
        .map(|(id, raw)| Block::from_raw(BlockId::from_raw(id), raw))
        .collect())
}
