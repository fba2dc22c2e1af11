//! Command handler helper functions
//!
//! Every endpoint runs its work as a `BotResult` and hands it to `respond`,
//! the one place where errors are logged and turned into a reply.

use crate::error::{BotError, BotResult, UserMessage};
use crate::keyboards;
use crate::types::HandlerResult;
use std::path::Path;
use teloxide::net::Download;
use teloxide::prelude::*;

/// Send the reply for a failed operation, or nothing if it succeeded
pub async fn respond(bot: &Bot, chat_id: ChatId, result: BotResult<()>) -> HandlerResult {
    let Err(err) = result else {
        return Ok(());
    };

    match &err {
        BotError::VaultError(e) if e.is_not_found() => {
            tracing::debug!(chat_id = chat_id.0, "Digest lookup missed");
        }
        BotError::VaultError(vault::VaultError::Unauthorized { .. })
        | BotError::VaultError(vault::VaultError::SubscriptionRequired { .. }) => {
            tracing::info!(chat_id = chat_id.0, error = %err, "Request rejected");
        }
        BotError::VaultError(vault::VaultError::MembershipCheckFailed { .. }) => {
            tracing::warn!(chat_id = chat_id.0, error = %err, "Membership check failed");
        }
        _ => tracing::error!(chat_id = chat_id.0, error = %err, "Handler failed"),
    }

    let mut reply = bot.send_message(chat_id, err.user_message());
    if let Some(markup) = err.subscribe_link().and_then(keyboards::subscribe_keyboard) {
        reply = reply.reply_markup(markup);
    }
    reply.await?;
    Ok(())
}

/// Telegram user id of the message author, if there is one
pub fn caller_id(msg: &Message) -> Option<u64> {
    msg.from().map(|user| user.id.0)
}

/// Fetch a file by its Bot API id into `target`
pub async fn download_to(bot: &Bot, file_id: &str, target: &Path) -> BotResult<()> {
    let file = bot.get_file(file_id).await?;
    let mut dst = tokio::fs::File::create(target).await?;
    bot.download_file(&file.path, &mut dst).await?;
    dst.sync_all().await?;
    Ok(())
}

/// Require a caller id or fail the request
pub fn require_caller(msg: &Message) -> BotResult<u64> {
    caller_id(msg).ok_or_else(|| {
        BotError::InvalidArguments("This bot only answers messages sent by users.".to_string())
    })
}
