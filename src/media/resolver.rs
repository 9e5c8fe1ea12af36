//! Concurrent resolution of a document's media tokens.
//!
//! The three resource classes run concurrently with each other. Within a
//! class, at most `concurrency` tokens are in flight and results keep
//! their first-seen order.

use super::boards::describe_board;
use super::images::{sniff_format, ImageFormat};
use super::sheets::resolve_sheet;
use super::store::{MediaStore, StoredMedia};
use super::tokens::MediaTokens;
use super::{MediaError, MediaResolution, ResolvedMedia};
use crate::api::LarkRepository;
use crate::constants::MAX_MEDIA_CONCURRENCY;
use crate::types::ResourceToken;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Tokens in flight per resource class. 1 means strictly sequential.
    pub concurrency: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

pub struct MediaResolver<'a, R: ?Sized> {
    repo: &'a R,
    store: &'a MediaStore,
    options: ResolveOptions,
}

struct ImageOutcome {
    token: ResourceToken,
    url: Option<String>,
    resolved: ResolvedMedia,
}

impl<'a, R> MediaResolver<'a, R>
where
    R: LarkRepository + ?Sized,
{
    pub fn new(repo: &'a R, store: &'a MediaStore, options: ResolveOptions) -> Self {
        Self {
            repo,
            store,
            options,
        }
    }

    fn concurrency(&self) -> usize {
        self.options.concurrency.clamp(1, MAX_MEDIA_CONCURRENCY as usize)
    }

    /// Resolves every distinct token. Never fails.
    pub async fn resolve(&self, tokens: &MediaTokens) -> MediaResolution {
        let images = tokens.distinct_images();
        let sheets = tokens.distinct_sheets();
        let boards = tokens.distinct_boards();

        if !tokens.is_empty() {
            log::info!(
                "Resolving {} image(s), {} sheet(s), {} board(s)",
                images.len(),
                sheets.len(),
                boards.len()
            );
        }

        let ((image_urls, images), sheets, boards) = tokio::join!(
            self.resolve_images(&images),
            self.resolve_sheets(&sheets),
            self.resolve_boards(&boards),
        );

        MediaResolution {
            image_urls,
            images,
            sheets,
            boards,
        }
    }

    async fn resolve_images(
        &self,
        tokens: &[ResourceToken],
    ) -> (
        IndexMap<ResourceToken, String>,
        IndexMap<ResourceToken, ResolvedMedia>,
    ) {
        let outcomes: Vec<ImageOutcome> = stream::iter(tokens.iter().cloned())
            .map(|token| async move { self.resolve_image(&token).await })
            .buffered(self.concurrency())
            .collect()
            .await;

        let mut urls = IndexMap::new();
        let mut resolved = IndexMap::new();
        for outcome in outcomes {
            if let Some(url) = outcome.url {
                urls.insert(outcome.token.clone(), url);
            }
            resolved.insert(outcome.token, outcome.resolved);
        }

        let stored = resolved
            .values()
            .filter(|r| matches!(r, ResolvedMedia::LocalFile(_)))
            .count();
        log::info!("Stored {}/{} images", stored, tokens.len());
        (urls, resolved)
    }

    async fn resolve_image(&self, token: &ResourceToken) -> ImageOutcome {
        let url = match self.download_url(token).await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("No download URL for image {}: {}", token.preview(), e);
                return ImageOutcome {
                    token: token.clone(),
                    url: None,
                    resolved: ResolvedMedia::Unresolved {
                        reason: e.to_string(),
                    },
                };
            }
        };

        let resolved = match self.fetch_and_store(&url, ImageFormat::Jpeg).await {
            Ok(stored) => {
                log::debug!("Processed image {} -> {}", token.preview(), stored.filename);
                ResolvedMedia::LocalFile(stored)
            }
            Err(e) => {
                log::warn!("Failed to download image {}: {}", token.preview(), e);
                ResolvedMedia::Unresolved {
                    reason: e.to_string(),
                }
            }
        };

        ImageOutcome {
            token: token.clone(),
            url: Some(url),
            resolved,
        }
    }

    async fn download_url(&self, token: &ResourceToken) -> Result<String, MediaError> {
        let urls = self.repo.image_download_urls(token).await?;
        urls.into_iter()
            .filter(|u| u.file_token.is_empty() || u.file_token == token.as_str())
            .map(|u| u.tmp_download_url)
            .find(|url| url.starts_with("http"))
            .ok_or(MediaError::NoDownloadUrl)
    }

    async fn fetch_and_store(
        &self,
        url: &str,
        fallback: ImageFormat,
    ) -> Result<StoredMedia, MediaError> {
        let media = self.repo.download(url).await?;
        let format = sniff_format(media.content_type.as_deref(), &media.bytes, fallback);
        self.store.persist(&media.bytes, format).await
    }

    async fn resolve_sheets(&self, tokens: &[ResourceToken]) -> IndexMap<ResourceToken, ResolvedMedia> {
        let outcomes: Vec<(ResourceToken, Option<ResolvedMedia>)> = stream::iter(tokens.iter().cloned())
            .map(|token| async move {
                let resolved = resolve_sheet(self.repo, &token).await;
                (token, resolved)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        outcomes
            .into_iter()
            .filter_map(|(token, resolved)| resolved.map(|r| (token, r)))
            .collect()
    }

    async fn resolve_boards(&self, tokens: &[ResourceToken]) -> IndexMap<ResourceToken, ResolvedMedia> {
        stream::iter(tokens.iter().cloned())
            .map(|token| async move {
                let resolved = self.resolve_board(&token).await;
                (token, resolved)
            })
            .buffered(self.concurrency())
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Parses the board's nodes and stores a rendered snapshot; either
    /// half may fail on its own.
    async fn resolve_board(&self, token: &ResourceToken) -> ResolvedMedia {
        let description = match self.repo.board_nodes(token).await {
            Ok(nodes) => Some(describe_board(&nodes)),
            Err(e) => {
                log::warn!("Failed to fetch nodes of board {}: {}", token.preview(), e);
                None
            }
        };

        let snapshot = match self.board_snapshot(token).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                log::warn!("Failed to fetch snapshot of board {}: {}", token.preview(), e);
                None
            }
        };

        if description.is_none() && snapshot.is_none() {
            return ResolvedMedia::Unresolved {
                reason: "neither nodes nor snapshot could be fetched".to_string(),
            };
        }
        ResolvedMedia::Diagram {
            description,
            snapshot,
        }
    }

    async fn board_snapshot(&self, token: &ResourceToken) -> Result<StoredMedia, MediaError> {
        let media = self.repo.board_snapshot(token).await?;
        let format = sniff_format(media.content_type.as_deref(), &media.bytes, ImageFormat::Png);
        self.store.persist(&media.bytes, format).await
    }
}
