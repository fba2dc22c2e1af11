//! Facade wiring the gate, hasher, index and gateway together
//!
//! Every operation authorizes first and touches the store only once the
//! caller is allowed, so a refused request never mutates anything.

use crate::config::Config;
use crate::digest::Digest;
use crate::error::{VaultError, VaultResult};
use crate::gate::{AccessGate, Action, MembershipDirectory};
use crate::gateway::{RetrievalGateway, VideoRecord};
use crate::hasher;
use crate::index::IndexRegistry;
use crate::system::{self, DiskUsage, SpeedReport, Speedtest};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Proof that a caller passed the upload gate, plus where the file goes.
///
/// Bytes land in a private staging file and only replace `destination` once
/// they have been hashed, so a failed upload never touches a stored video.
#[derive(Debug)]
pub struct UploadPermit {
    user_id: u64,
    staging: PathBuf,
    destination: PathBuf,
}

impl UploadPermit {
    /// Where the transport should write the uploaded bytes
    pub fn download_path(&self) -> &Path {
        &self.staging
    }

    /// Final storage path once the upload is ingested
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Proof that a caller passed the speed test gate
#[derive(Debug)]
pub struct SpeedtestPermit {
    user_id: u64,
}

/// Cheaply cloneable handle shared by every handler
#[derive(Clone)]
pub struct VaultApi {
    inner: Arc<Inner>,
}

struct Inner {
    gate: AccessGate,
    registry: IndexRegistry,
    gateway: RetrievalGateway,
    speedtest: Speedtest,
    disk_usage_path: PathBuf,
    staged_uploads: AtomicU64,
}

impl VaultApi {
    /// Build the vault from configuration, creating the video directory and
    /// index file if they do not exist yet
    pub async fn from_config(
        config: &Config,
        directory: Arc<dyn MembershipDirectory>,
    ) -> VaultResult<Self> {
        let registry = IndexRegistry::from_config(&config.store).await?;
        Self::with_registry(config, directory, registry).await
    }

    /// Build the vault around an existing index registry
    pub async fn with_registry(
        config: &Config,
        directory: Arc<dyn MembershipDirectory>,
        registry: IndexRegistry,
    ) -> VaultResult<Self> {
        tokio::fs::create_dir_all(&config.store.video_dir).await?;

        tracing::info!(
            video_dir = %config.store.video_dir.display(),
            index_mode = ?config.store.index_mode,
            "Vault ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                gate: AccessGate::new(config.access.clone(), directory),
                registry,
                gateway: RetrievalGateway::new(&config.store.video_dir),
                speedtest: Speedtest::new(config.speedtest.clone()),
                disk_usage_path: config.disk_usage_path.clone(),
                staged_uploads: AtomicU64::new(0),
            }),
        })
    }

    pub fn gate(&self) -> &AccessGate {
        &self.inner.gate
    }

    pub fn gateway(&self) -> &RetrievalGateway {
        &self.inner.gateway
    }

    /// Gate the greeting
    pub async fn start(&self, user_id: u64) -> VaultResult<()> {
        self.inner.gate.require(user_id, Action::Start).await
    }

    /// Authorize an upload and pick its target path from the transport's
    /// file identifier
    pub async fn begin_upload(&self, user_id: u64, file_id: &str) -> VaultResult<UploadPermit> {
        self.inner.gate.require(user_id, Action::Upload).await?;

        let name = sanitize_file_id(file_id);
        let video_dir = self.inner.gateway.video_dir();
        let sequence = self.inner.staged_uploads.fetch_add(1, Ordering::Relaxed);

        Ok(UploadPermit {
            user_id,
            staging: video_dir.join(format!(".{}.{}.{}.part", name, std::process::id(), sequence)),
            destination: video_dir.join(format!("{}.mp4", name)),
        })
    }

    /// Hash the downloaded file, move it into place and record it for
    /// `chat_id`.
    ///
    /// If hashing or the move fails the staging file is removed and no
    /// mapping is left behind.
    pub async fn ingest(&self, permit: UploadPermit, chat_id: i64) -> VaultResult<VideoRecord> {
        let result = self.record_upload(&permit, chat_id).await;

        match result {
            Ok(record) => {
                tracing::info!(
                    user_id = permit.user_id,
                    digest = %record.digest,
                    size = record.size,
                    "Stored video"
                );
                Ok(record)
            }
            Err(err) => {
                tracing::error!(error = %err, path = %permit.staging.display(), "Upload failed");
                self.abort_upload(permit).await;
                Err(err)
            }
        }
    }

    /// Discard a partially written upload. Only the staging file is removed.
    pub async fn abort_upload(&self, permit: UploadPermit) {
        if let Err(e) = tokio::fs::remove_file(&permit.staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %permit.staging.display(), "Failed to remove partial upload");
            }
        }
    }

    async fn record_upload(&self, permit: &UploadPermit, chat_id: i64) -> VaultResult<VideoRecord> {
        let digest = hasher::hash_file(&permit.staging).await?;
        let size = tokio::fs::metadata(&permit.staging).await?.len();

        tokio::fs::rename(&permit.staging, &permit.destination).await?;

        self.inner
            .registry
            .for_chat(chat_id)
            .insert(&digest, &permit.destination)
            .await?;

        Ok(VideoRecord {
            digest,
            storage_path: permit.destination.clone(),
            size,
        })
    }

    /// Resolve a digest sent as plain text
    pub async fn retrieve(&self, user_id: u64, chat_id: i64, text: &str) -> VaultResult<VideoRecord> {
        self.inner.gate.require(user_id, Action::Retrieve).await?;

        let digest = Digest::parse(text)?;
        let index = self.inner.registry.for_chat(chat_id);
        self.inner.gateway.retrieve(index.as_ref(), &digest).await
    }

    /// Remove a video and its mapping, returning the deleted path
    pub async fn delete(&self, user_id: u64, chat_id: i64, text: &str) -> VaultResult<PathBuf> {
        self.inner.gate.require(user_id, Action::Delete).await?;

        let digest = Digest::parse(text)?;
        let index = self.inner.registry.for_chat(chat_id);

        let path = index.lookup(&digest).await?;
        if !self.inner.gateway.is_contained(&path).await {
            tracing::warn!(digest = %digest, path = %path.display(), "Refusing to delete outside the video directory");
            return Err(VaultError::DigestNotFound(digest.to_string()));
        }

        let path = index.delete(&digest).await?;
        tracing::info!(user_id, digest = %digest, path = %path.display(), "Deleted video");
        Ok(path)
    }

    /// Ungated lookup against the shared index, for the HTTP subsystem
    pub async fn peek(&self, text: &str) -> VaultResult<VideoRecord> {
        let digest = Digest::parse(text)?;
        let index = self
            .inner
            .registry
            .global()
            .ok_or_else(|| VaultError::DigestNotFound(digest.to_string()))?;
        self.inner.gateway.retrieve(index.as_ref(), &digest).await
    }

    /// Authorize a speed test. The permit is spent by `run_speed_test`.
    pub async fn begin_speed_test(&self, user_id: u64) -> VaultResult<SpeedtestPermit> {
        self.inner.gate.require(user_id, Action::Speedtest).await?;
        Ok(SpeedtestPermit { user_id })
    }

    pub async fn run_speed_test(&self, permit: SpeedtestPermit) -> VaultResult<SpeedReport> {
        tracing::info!(user_id = permit.user_id, "Running speed test");
        self.inner.speedtest.run().await
    }

    pub async fn local_storage(&self, user_id: u64) -> VaultResult<DiskUsage> {
        self.inner.gate.require(user_id, Action::DiskUsage).await?;
        system::disk_usage(&self.inner.disk_usage_path).await
    }
}

/// Keep transport file identifiers safe to use as a filename
fn sanitize_file_id(file_id: &str) -> String {
    let cleaned: String = file_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_id() {
        assert_eq!(sanitize_file_id("BAACAgIAAxkBAAIB"), "BAACAgIAAxkBAAIB");
        assert_eq!(sanitize_file_id("a-b_c"), "a-b_c");
        assert_eq!(sanitize_file_id("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_file_id(""), "upload");
    }
}
