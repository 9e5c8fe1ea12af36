//! On-disk cache of downloaded media.
//!
//! Every file gets a fresh UUIDv4 name, so concurrent writers never
//! collide and nothing is ever read back or overwritten.

use super::images::ImageFormat;
use super::MediaError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A file written to the media directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    /// Bare filename, `<uuid-hex>.<ext>`
    pub filename: String,
    pub format: ImageFormat,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a new unique name, creating the directory if needed.
    pub async fn persist(&self, bytes: &[u8], format: ImageFormat) -> Result<StoredMedia, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::EmptyBody);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("{}.{}", Uuid::new_v4().simple(), format.extension());
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;

        log::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(StoredMedia {
            filename,
            format,
            path,
        })
    }
}
