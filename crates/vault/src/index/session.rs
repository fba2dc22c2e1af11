use super::HashIndex;
use crate::digest::Digest;
use crate::error::{VaultError, VaultResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Capacity-1 index: only the most recent upload of a conversation.
///
/// Every insert unconditionally replaces the slot, there is no eviction
/// policy beyond that and nothing is persisted.
#[derive(Default)]
pub struct SessionIndex {
    slot: RwLock<Option<(Digest, PathBuf)>>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HashIndex for SessionIndex {
    async fn insert(&self, digest: &Digest, path: &Path) -> VaultResult<()> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some((digest.clone(), path.to_path_buf()));
        Ok(())
    }

    async fn lookup(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((stored, path)) if stored == digest => Ok(path.clone()),
            _ => Err(VaultError::DigestNotFound(digest.to_string())),
        }
    }

    async fn remove(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        match slot.take() {
            Some((stored, path)) if &stored == digest => Ok(path),
            other => {
                *slot = other;
                Err(VaultError::DigestNotFound(digest.to_string()))
            }
        }
    }

    async fn load_all(&self) -> VaultResult<BTreeMap<Digest, PathBuf>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(slot.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::hash_bytes;

    #[tokio::test]
    async fn test_holds_only_latest_upload() {
        let index = SessionIndex::new();
        let first = hash_bytes(b"first");
        let second = hash_bytes(b"second");

        index.insert(&first, Path::new("videos/1.mp4")).await.unwrap();
        assert_eq!(index.lookup(&first).await.unwrap(), PathBuf::from("videos/1.mp4"));

        index.insert(&second, Path::new("videos/2.mp4")).await.unwrap();
        assert!(index.lookup(&first).await.is_err());
        assert_eq!(index.lookup(&second).await.unwrap(), PathBuf::from("videos/2.mp4"));
        assert_eq!(index.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_other_digest_keeps_slot() {
        let index = SessionIndex::new();
        let kept = hash_bytes(b"kept");
        index.insert(&kept, Path::new("videos/k.mp4")).await.unwrap();

        assert!(index.remove(&hash_bytes(b"other")).await.is_err());
        assert!(index.lookup(&kept).await.is_ok());

        index.remove(&kept).await.unwrap();
        assert!(index.load_all().await.unwrap().is_empty());
    }
}
