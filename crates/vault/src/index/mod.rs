//! Digest → storage path index
//!
//! `HashIndex` is the only writer of the mapping. Implementations:
//! - `JsonFileIndex`: whole map persisted to one JSON file after every mutation
//! - `SessionIndex`: capacity-1 slot holding the most recent upload
//! - `MemoryIndex`: process-local map for tests and embedding
//!
//! `IndexRegistry` picks the right one for a chat based on `IndexMode`.

mod json;
mod memory;
mod registry;
mod session;

pub use json::JsonFileIndex;
pub use memory::MemoryIndex;
pub use registry::IndexRegistry;
pub use session::SessionIndex;

use crate::digest::Digest;
use crate::error::VaultResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key-value abstraction over the digest mapping
#[async_trait]
pub trait HashIndex: Send + Sync {
    /// Record or overwrite the mapping and persist it before returning
    async fn insert(&self, digest: &Digest, path: &Path) -> VaultResult<()>;

    /// Resolve a digest, failing with `DigestNotFound` when absent
    async fn lookup(&self, digest: &Digest) -> VaultResult<PathBuf>;

    /// Drop the mapping only, returning the path it pointed at
    async fn remove(&self, digest: &Digest) -> VaultResult<PathBuf>;

    /// Snapshot of every entry
    async fn load_all(&self) -> VaultResult<BTreeMap<Digest, PathBuf>>;

    /// Remove the backing file, then the mapping.
    ///
    /// The file goes first so a failure leaves at worst an orphan file with
    /// its mapping intact, never a mapping whose removal was persisted while
    /// the file survives. A file that is already gone is tolerated so
    /// dangling entries can be cleaned up.
    async fn delete(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let path = self.lookup(digest).await?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    digest = %digest,
                    path = %path.display(),
                    "Backing file already missing, dropping dangling entry"
                );
            }
            Err(e) => return Err(e.into()),
        }

        self.remove(digest).await
    }
}
