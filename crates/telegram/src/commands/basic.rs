//! Basic bot commands (start, help, fallback)

use crate::constants::messages;
use crate::error::BotResult;
use crate::handlers::{self, require_caller};
use crate::types::{Command, HandlerResult};
use teloxide::{prelude::*, utils::command::BotCommands};
use vault::VaultApi;

/// Welcome message, shown to subscribers only
pub async fn start(bot: Bot, msg: Message, vault: VaultApi) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        vault.start(user_id).await?;
        bot.send_message(msg.chat.id, messages::WELCOME).await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Handle anything no other branch accepted
pub async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, messages::INVALID_STATE).await?;
    Ok(())
}
