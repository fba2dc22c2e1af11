pub mod commands;
pub mod constants;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod keyboards;
pub mod telegram;
pub mod types;
pub mod utils;

pub use directory::TelegramDirectory;
pub use error::{BotError, BotResult, UserMessage};
pub use teloxide::prelude::Dispatcher;
pub use types::{BotProfile, Command, HandlerResult};
