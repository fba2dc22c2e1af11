use std::sync::Arc;

use anyhow::Context;
use ::telegram::{telegram, BotProfile, TelegramDirectory};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;
use vault::{Config, VaultApi};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();
    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize the bot from TELOXIDE_TOKEN
    let bot = Bot::from_env();

    let me = bot.get_me().await.context("Failed to reach the Bot API")?;
    let profile = BotProfile {
        username: me.user.username.clone().unwrap_or_default(),
    };

    let directory = Arc::new(TelegramDirectory::new(bot.clone()));
    let vault = VaultApi::from_config(&config, directory)
        .await
        .context("Failed to open the video store")?;

    tracing::info!(
        bot = %profile.username,
        channel = %config.access.channel_username,
        video_dir = %config.store.video_dir.display(),
        index_mode = ?config.store.index_mode,
        "Bot started successfully"
    );

    if config.http.enabled {
        let server = fileserver::FileServerApi::new(vault.clone(), &config.http);
        tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                tracing::error!(error = %e, "HTTP server stopped");
            }
        });
    }

    if let Err(e) = telegram::set_bot_commands(&bot).await {
        tracing::warn!(error = %e, "Failed to register bot commands");
    }

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![vault, profile])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
