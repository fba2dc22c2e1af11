use crate::error::{VaultError, VaultResult};
use std::path::Path;

/// Space on the filesystem holding a path, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    /// Space available to this process
    pub free: u64,
}

/// Report usage of the filesystem containing `path`
pub async fn disk_usage(path: impl AsRef<Path>) -> VaultResult<DiskUsage> {
    let path = path.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let total = fs2::total_space(&path)?;
        let unreserved = fs2::free_space(&path)?;
        let free = fs2::available_space(&path)?;
        Ok::<_, std::io::Error>(DiskUsage {
            total,
            used: total.saturating_sub(unreserved),
            free,
        })
    })
    .await
    .map_err(|e| VaultError::ExternalService(format!("disk usage task failed: {}", e)))?
    .map_err(|e| VaultError::ExternalService(format!("disk usage unavailable: {}", e)))
}
