//! Index persisted as a single JSON object

use super::HashIndex;
use crate::digest::Digest;
use crate::error::{VaultError, VaultResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk layout: `{ "<digest>": "<path>" }`
type RawIndex = BTreeMap<String, PathBuf>;

/// Hash index backed by one JSON file.
///
/// Every operation reads the whole file; every mutation writes the whole map
/// back through a temp file + rename. Mutations inside this process are
/// serialised, a second process writing the same file is last-writer-wins.
pub struct JsonFileIndex {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileIndex {
    /// Open the index, creating an empty file (and parent directory) if absent
    pub async fn open(path: impl Into<PathBuf>) -> VaultResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let index = Self {
            path,
            write_lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&index.path).await? {
            index.persist(&RawIndex::new()).await?;
            tracing::info!(path = %index.path.display(), "Created empty hash index");
        }

        Ok(index)
    }

    /// Location of the index file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> VaultResult<RawIndex> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(RawIndex::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RawIndex::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, raw: &RawIndex) -> VaultResult<()> {
        let bytes = serde_json::to_vec(raw)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), entries = raw.len(), "Persisted hash index");
        Ok(())
    }
}

#[async_trait]
impl HashIndex for JsonFileIndex {
    async fn insert(&self, digest: &Digest, path: &Path) -> VaultResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.read_raw().await?;

        if let Some(previous) = raw.insert(digest.to_string(), path.to_path_buf()) {
            if previous != path {
                tracing::info!(
                    digest = %digest,
                    previous = %previous.display(),
                    "Overwriting mapping, previous file is now orphaned"
                );
            }
        }

        self.persist(&raw).await
    }

    async fn lookup(&self, digest: &Digest) -> VaultResult<PathBuf> {
        self.read_raw()
            .await?
            .remove(digest.as_str())
            .ok_or_else(|| VaultError::DigestNotFound(digest.to_string()))
    }

    async fn remove(&self, digest: &Digest) -> VaultResult<PathBuf> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.read_raw().await?;

        let path = raw
            .remove(digest.as_str())
            .ok_or_else(|| VaultError::DigestNotFound(digest.to_string()))?;

        self.persist(&raw).await?;
        Ok(path)
    }

    async fn load_all(&self) -> VaultResult<BTreeMap<Digest, PathBuf>> {
        let raw = self.read_raw().await?;
        let mut entries = BTreeMap::new();

        for (key, path) in raw {
            match Digest::parse(&key) {
                Ok(digest) => {
                    entries.insert(digest, path);
                }
                Err(_) => tracing::warn!(key = %key, "Skipping malformed index key"),
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::hash_bytes;
    use std::sync::Arc;

    async fn open_index(dir: &tempfile::TempDir) -> JsonFileIndex {
        JsonFileIndex::open(dir.path().join("video_hashes.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;

        let contents = tokio::fs::read_to_string(index.path()).await.unwrap();
        assert_eq!(contents, "{}");
        assert!(index.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("index.json");
        JsonFileIndex::open(&nested).await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_insert_lookup_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;
        let digest = hash_bytes(b"clip");

        index.insert(&digest, Path::new("videos/a.mp4")).await.unwrap();
        assert_eq!(index.lookup(&digest).await.unwrap(), PathBuf::from("videos/a.mp4"));

        // Idempotent re-insert
        index.insert(&digest, Path::new("videos/a.mp4")).await.unwrap();
        assert_eq!(index.lookup(&digest).await.unwrap(), PathBuf::from("videos/a.mp4"));
        assert_eq!(index.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;
        let digest = hash_bytes(b"clip");

        index.insert(&digest, Path::new("videos/first.mp4")).await.unwrap();
        index.insert(&digest, Path::new("videos/second.mp4")).await.unwrap();

        assert_eq!(index.lookup(&digest).await.unwrap(), PathBuf::from("videos/second.mp4"));
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let digest = hash_bytes(b"persisted");

        open_index(&dir)
            .await
            .insert(&digest, Path::new("videos/p.mp4"))
            .await
            .unwrap();

        let reopened = open_index(&dir).await;
        assert_eq!(reopened.lookup(&digest).await.unwrap(), PathBuf::from("videos/p.mp4"));
    }

    #[tokio::test]
    async fn test_reads_flat_map_written_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_hashes.json");
        let digest = hash_bytes(b"legacy");
        let contents = format!("{{\"{}\": \"videos/legacy.mp4\", \"junk\": \"x\"}}", digest);
        tokio::fs::write(&path, contents).await.unwrap();

        let index = JsonFileIndex::open(&path).await.unwrap();
        assert_eq!(index.lookup(&digest).await.unwrap(), PathBuf::from("videos/legacy.mp4"));

        // Malformed keys are skipped rather than failing the load
        let all = index.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;

        let err = index.lookup(&hash_bytes(b"absent")).await.unwrap_err();
        assert!(matches!(err, VaultError::DigestNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;
        let file = dir.path().join("clip.mp4");
        tokio::fs::write(&file, b"clip").await.unwrap();
        let digest = hash_bytes(b"clip");

        index.insert(&digest, &file).await.unwrap();
        assert_eq!(index.delete(&digest).await.unwrap(), file);

        assert!(!file.exists());
        assert!(matches!(
            index.lookup(&digest).await.unwrap_err(),
            VaultError::DigestNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_absent_performs_no_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;
        let kept = hash_bytes(b"kept");
        index.insert(&kept, Path::new("videos/kept.mp4")).await.unwrap();
        let before = tokio::fs::read(index.path()).await.unwrap();

        let err = index.delete(&hash_bytes(b"absent")).await.unwrap_err();
        assert!(matches!(err, VaultError::DigestNotFound(_)));

        let after = tokio::fs::read(index.path()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_delete_dangling_entry() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir).await;
        let digest = hash_bytes(b"gone");

        index
            .insert(&digest, &dir.path().join("never-written.mp4"))
            .await
            .unwrap();

        index.delete(&digest).await.unwrap();
        assert!(index.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_on_distinct_digests() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(open_index(&dir).await);

        let tasks: Vec<_> = (0..16u8)
            .map(|i| {
                let index = Arc::clone(&index);
                tokio::spawn(async move {
                    let digest = hash_bytes(&[i]);
                    let path = PathBuf::from(format!("videos/{}.mp4", i));
                    index.insert(&digest, &path).await.unwrap();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(index.load_all().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_same_digest_race_is_last_writer_wins() {
        // Two handles on one file stand in for two processes: no shared lock,
        // whichever insert lands last owns the entry.
        let dir = tempfile::tempdir().unwrap();
        let first = open_index(&dir).await;
        let second = open_index(&dir).await;
        let digest = hash_bytes(b"contested");

        first.insert(&digest, Path::new("videos/one.mp4")).await.unwrap();
        second.insert(&digest, Path::new("videos/two.mp4")).await.unwrap();

        assert_eq!(first.lookup(&digest).await.unwrap(), PathBuf::from("videos/two.mp4"));
    }
}
