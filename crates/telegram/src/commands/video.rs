//! Video commands (upload, retrieve by hash, delete)

use crate::constants::{emoji, usage, HASH_DISPLAY_LENGTH};
use crate::error::{BotError, BotResult};
use crate::handlers::{self, require_caller};
use crate::keyboards;
use crate::types::{BotProfile, HandlerResult};
use crate::utils;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use vault::VaultApi;

/// Store an uploaded video and reply with its hash (admin only)
pub async fn upload_video(
    bot: Bot,
    msg: Message,
    vault: VaultApi,
    profile: BotProfile,
) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        let Some(video) = msg.video() else {
            return Err(BotError::InvalidArguments("Please send a video.".to_string()));
        };

        let permit = vault.begin_upload(user_id, &video.file.id).await?;

        if let Err(err) = handlers::download_to(&bot, &video.file.id, permit.download_path()).await {
            vault.abort_upload(permit).await;
            return Err(err);
        }

        let record = vault.ingest(permit, msg.chat.id.0).await?;
        let digest = record.digest.as_str();

        let text = format!(
            "{} Video uploaded successfully! Hash: {}\nSize: {}",
            emoji::SUCCESS,
            digest,
            utils::format_bytes(record.size)
        );
        let mut reply = bot.send_message(msg.chat.id, text);
        if let Some(markup) = keyboards::retrieval_keyboard(&profile.username, digest) {
            reply = reply.reply_markup(markup);
        }
        reply.await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}

/// Send back the video whose hash is the message text
pub async fn retrieve(bot: Bot, msg: Message, vault: VaultApi, text: String) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        let record = vault.retrieve(user_id, msg.chat.id.0, &text).await?;

        tracing::info!(
            user_id,
            digest = utils::truncate_hash(record.digest.as_str(), HASH_DISPLAY_LENGTH),
            "Sending stored video"
        );
        bot.send_video(msg.chat.id, InputFile::file(record.storage_path.clone()))
            .await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}

/// Delete a stored video and its hash mapping (admin only)
pub async fn delete(bot: Bot, msg: Message, vault: VaultApi, digest: String) -> HandlerResult {
    let result = async {
        let user_id = require_caller(&msg)?;
        let digest = digest.trim();
        if digest.is_empty() {
            return Err(BotError::InvalidArguments(usage::DELETE.to_string()));
        }

        vault.delete(user_id, msg.chat.id.0, digest).await?;

        bot.send_message(
            msg.chat.id,
            format!(
                "{} Video with hash {} has been deleted successfully!",
                emoji::SUCCESS,
                digest
            ),
        )
        .await?;
        BotResult::Ok(())
    }
    .await;

    handlers::respond(&bot, msg.chat.id, result).await
}
