//! Retrieval gateway: digest → file on disk

use crate::digest::Digest;
use crate::error::{VaultError, VaultResult};
use crate::index::HashIndex;
use std::path::{Path, PathBuf};

/// A stored video resolved from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub digest: Digest,
    pub storage_path: PathBuf,
    pub size: u64,
}

/// Resolves digests to readable files inside the storage directory.
///
/// Files are served as they are on disk, nothing is re-hashed.
#[derive(Debug, Clone)]
pub struct RetrievalGateway {
    video_dir: PathBuf,
}

impl RetrievalGateway {
    pub fn new(video_dir: impl Into<PathBuf>) -> Self {
        Self {
            video_dir: video_dir.into(),
        }
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    /// Look up `digest` and confirm the file can be served
    pub async fn retrieve(&self, index: &dyn HashIndex, digest: &Digest) -> VaultResult<VideoRecord> {
        let storage_path = index.lookup(digest).await?;

        if !self.is_contained(&storage_path).await {
            tracing::warn!(
                digest = %digest,
                path = %storage_path.display(),
                "Index entry points outside the video directory"
            );
            return Err(VaultError::DigestNotFound(digest.to_string()));
        }

        let metadata = match tokio::fs::metadata(&storage_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    digest = %digest,
                    path = %storage_path.display(),
                    "Dangling index entry, backing file is missing"
                );
                return Err(VaultError::DigestNotFound(digest.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(VideoRecord {
            digest: digest.clone(),
            storage_path,
            size: metadata.len(),
        })
    }

    /// Open a resolved record for streaming
    pub async fn open(&self, record: &VideoRecord) -> VaultResult<tokio::fs::File> {
        Ok(tokio::fs::File::open(&record.storage_path).await?)
    }

    pub(crate) async fn is_contained(&self, path: &Path) -> bool {
        let (Ok(root), Ok(candidate)) = (
            tokio::fs::canonicalize(&self.video_dir).await,
            tokio::fs::canonicalize(path).await,
        ) else {
            // Nothing to resolve yet; let the metadata check report it
            return !path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        };
        candidate.starts_with(root)
    }
}
