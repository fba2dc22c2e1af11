//! Streaming SHA-256 content hasher

use crate::digest::Digest;
use sha2::{Digest as _, Sha256};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Chunk size used when folding a stream into the digest
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Hash everything `reader` yields, one chunk at a time
pub async fn hash_reader<R>(mut reader: R) -> std::io::Result<Digest>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(Digest::from_bytes(&hasher.finalize()))
}

/// Hash a file on disk
pub async fn hash_file(path: impl AsRef<Path>) -> std::io::Result<Digest> {
    let file = tokio::fs::File::open(path.as_ref()).await?;
    hash_reader(file).await
}

/// Hash an in-memory buffer
pub fn hash_bytes(bytes: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Digest::from_bytes(&hasher.finalize())
}
