//! HTTP health and lookup endpoint
//!
//! Runs beside the bot on its own task. Besides the health route it can
//! answer whether a digest is stored and, when enabled, stream the video with
//! range request support.

mod server;
mod state;

pub use server::FileServerApi;
pub use state::ServerState;

/// Result type alias for file server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
