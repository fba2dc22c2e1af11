//! Host probes (speed test, local storage)

use crate::constants::messages;
use crate::error::BotResult;
use crate::handlers::{self, require_caller};
use crate::types::HandlerResult;
use crate::utils;
use teloxide::prelude::*;
use vault::VaultApi;

/// Measure download and upload throughput (admin only)
pub async fn speed(bot: Bot, msg: Message, vault: VaultApi) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        // Authorize before announcing so refused callers get a single reply
        let permit = vault.begin_speed_test(user_id).await?;

        bot.send_message(msg.chat.id, messages::MEASURING_SPEED).await?;
        let report = vault.run_speed_test(permit).await?;

        bot.send_message(msg.chat.id, utils::format_speed_report(&report))
            .await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}

/// Report usage of the filesystem holding the bot's data
pub async fn local(bot: Bot, msg: Message, vault: VaultApi) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        let usage = vault.local_storage(user_id).await?;

        bot.send_message(msg.chat.id, utils::format_disk_usage(&usage))
            .await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}
