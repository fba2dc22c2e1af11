use super::HashIndex;
use crate::digest::Digest;
use crate::error::{VaultError, VaultResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Process-local index with no durable state
#[derive(Default)]
pub struct MemoryIndex {
    entries: RwLock<BTreeMap<Digest, PathBuf>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HashIndex for MemoryIndex {
    async fn insert(&self, digest: &Digest, path: &Path) -> VaultResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(digest.clone(), path.to_path_buf());
        Ok(())
    }

    async fn lookup(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(digest)
            .cloned()
            .ok_or_else(|| VaultError::DigestNotFound(digest.to_string()))
    }

    async fn remove(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .remove(digest)
            .ok_or_else(|| VaultError::DigestNotFound(digest.to_string()))
    }

    async fn load_all(&self) -> VaultResult<BTreeMap<Digest, PathBuf>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.clone())
    }
}
