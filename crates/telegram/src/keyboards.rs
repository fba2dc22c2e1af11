//! Inline keyboard builders
//!
//! Both keyboards are single URL buttons: one sends the user to the required
//! channel, the other reopens the bot with a digest pre-filled.

use crate::constants::messages;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

/// Keyboard pointing the user at the channel they must join
///
/// Returns `None` if `link` is not a valid URL.
pub fn subscribe_keyboard(link: &str) -> Option<InlineKeyboardMarkup> {
    let url = Url::parse(link).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(messages::SUBSCRIBE_BUTTON, url),
    ]]))
}

/// `tg://resolve` link that opens a chat with the bot and pre-fills `digest`
pub fn retrieval_link(bot_username: &str, digest: &str) -> Option<Url> {
    let link = format!(
        "tg://resolve?domain={}&text={}",
        urlencoding::encode(bot_username),
        urlencoding::encode(digest)
    );
    Url::parse(&link).ok()
}

/// Keyboard attached to the upload confirmation
pub fn retrieval_keyboard(bot_username: &str, digest: &str) -> Option<InlineKeyboardMarkup> {
    let url = retrieval_link(bot_username, digest)?;
    Some(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(messages::RETRIEVE_BUTTON, url),
    ]]))
}
