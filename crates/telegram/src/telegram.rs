use crate::commands;
use crate::types::Command;
use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Plain text that is not a command, treated as a digest
fn digest_text(msg: Message) -> Option<String> {
    msg.text()
        .filter(|text| !text.starts_with('/'))
        .map(|text| text.trim().to_owned())
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::Speed].endpoint(commands::speed))
        .branch(case![Command::Local].endpoint(commands::local))
        .branch(case![Command::Delete(digest)].endpoint(commands::delete));

    Update::filter_message()
        .branch(command_handler)
        .branch(dptree::filter(|msg: Message| msg.video().is_some()).endpoint(commands::upload_video))
        .branch(dptree::filter_map(digest_text).endpoint(commands::retrieve))
        .branch(dptree::endpoint(commands::invalid_state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(text: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": { "id": 555, "type": "private", "first_name": "Ada" },
            "from": { "id": 1001, "is_bot": false, "first_name": "Ada" },
            "text": text
        }))
        .unwrap()
    }

    #[test]
    fn test_schema_builds() {
        let _ = schema();
    }

    #[test]
    fn test_digest_text() {
        let digest = "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882";
        assert_eq!(
            digest_text(text_message(&format!(" {} ", digest))),
            Some(digest.to_string())
        );
        assert_eq!(digest_text(text_message("/magnet")), None);
    }

    #[test]
    fn test_caller_id() {
        assert_eq!(crate::handlers::caller_id(&text_message("hi")), Some(1001));
    }
}
