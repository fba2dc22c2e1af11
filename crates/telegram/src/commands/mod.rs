//! Command handlers for the Telegram bot
//!
//! This module contains all command handler functions organized by category:
//! - `basic`: start, help, fallback
//! - `video`: upload, retrieval by hash, delete
//! - `system`: speed test and local storage probes

mod basic;
mod system;
mod video;

pub use basic::*;
pub use system::*;
pub use video::*;
