//! Shared state handed to every route

use chrono::{DateTime, Utc};
use vault::VaultApi;

#[derive(Clone)]
pub struct ServerState {
    vault: VaultApi,
    /// Whether `/video/{digest}/raw` streams bytes
    serve_files: bool,
    started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(vault: VaultApi, serve_files: bool) -> Self {
        Self {
            vault,
            serve_files,
            started_at: Utc::now(),
        }
    }

    pub fn vault(&self) -> &VaultApi {
        &self.vault
    }

    pub fn serve_files(&self) -> bool {
        self.serve_files
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
