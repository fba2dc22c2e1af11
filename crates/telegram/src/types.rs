use teloxide::macros::BotCommands;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Identity of the running bot, fetched once at start-up
#[derive(Clone, Debug)]
pub struct BotProfile {
    pub username: String,
}

/// Available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,
    #[command(description = "Display help information")]
    Help,
    #[command(description = "Measure the server's internet speed (admin only)")]
    Speed,
    #[command(description = "Show local storage usage")]
    Local,
    #[command(description = "Delete a stored video by its hash (admin only)")]
    Delete(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::utils::command::BotCommands as _;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "leafsavebot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/speed", "leafsavebot").unwrap(), Command::Speed);
        assert_eq!(Command::parse("/local@leafsavebot", "leafsavebot").unwrap(), Command::Local);
    }

    #[test]
    fn test_parse_delete_argument() {
        let digest = "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882";
        assert_eq!(
            Command::parse(&format!("/delete {}", digest), "leafsavebot").unwrap(),
            Command::Delete(digest.to_string())
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("/magnet", "leafsavebot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/start", "/help", "/speed", "/local", "/delete"] {
            assert!(help.contains(name), "missing {} in help", name);
        }
    }
}
