//! Content-addressed video vault
//!
//! This crate holds everything the bot does apart from talking to Telegram:
//! hashing uploads, keeping the digest index, resolving digests back to
//! files, deciding who may do what, and the host probes behind `/speed` and
//! `/local`.

pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod hasher;
pub mod index;
pub mod system;

pub use api::{SpeedtestPermit, UploadPermit, VaultApi};
pub use config::{AccessConfig, Config, HttpConfig, IndexMode, SpeedtestConfig, StoreConfig};
pub use digest::Digest;
pub use error::{VaultError, VaultResult};
pub use gate::{
    AccessGate, Action, Authorization, DenyReason, DirectoryError, MembershipDirectory,
    MembershipStatus, Role, StaticDirectory,
};
pub use gateway::{RetrievalGateway, VideoRecord};
pub use index::{HashIndex, IndexRegistry, JsonFileIndex, MemoryIndex, SessionIndex};
