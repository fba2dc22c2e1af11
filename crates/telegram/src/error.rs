use crate::constants::{emoji, messages};
use thiserror::Error;
use vault::VaultError;

/// Custom error type for telegram bot operations
#[derive(Debug, Error)]
pub enum BotError {
    /// Telegram API error
    #[error("Telegram error: {0}")]
    TelegramError(#[from] teloxide::RequestError),
    /// Fetching an uploaded file failed
    #[error("Download error: {0}")]
    DownloadError(#[from] teloxide::DownloadError),
    /// Store, gate or probe error
    #[error(transparent)]
    VaultError(#[from] VaultError),
    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::VaultError(VaultError::Io(err))
    }
}

impl BotError {
    /// Channel link to offer alongside the reply, if the caller should
    /// (re)subscribe
    pub fn subscribe_link(&self) -> Option<&str> {
        match self {
            BotError::VaultError(VaultError::SubscriptionRequired { link, .. })
            | BotError::VaultError(VaultError::MembershipCheckFailed { link, .. }) => Some(link),
            _ => None,
        }
    }
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self {
            BotError::TelegramError(e) => format!("{} Communication error: {}", emoji::ERROR, e),
            BotError::DownloadError(e) => {
                format!("{} Failed to download the video: {}", emoji::ERROR, e)
            }
            BotError::VaultError(e) => e.user_message(),
            BotError::InvalidArguments(msg) => format!("{} {}", emoji::ERROR, msg),
        }
    }
}

impl UserMessage for VaultError {
    fn user_message(&self) -> String {
        match self {
            VaultError::Unauthorized { action } => format!("Only admins can {}.", action),
            VaultError::SubscriptionRequired { channel, .. } => format!(
                "To interact with this bot, please subscribe to our channel: {}",
                channel
            ),
            VaultError::MembershipCheckFailed { channel, .. } => format!(
                "{} Could not verify your subscription to {} right now. \
                Make sure you are subscribed and try again shortly.",
                emoji::WARNING,
                channel
            ),
            VaultError::DigestNotFound(_) | VaultError::InvalidDigest(_) => {
                messages::HASH_NOT_FOUND.to_string()
            }
            VaultError::Io(_) | VaultError::Persistence(_) => {
                format!("{} Storage error, please try again later.", emoji::ERROR)
            }
            VaultError::ExternalService(msg) => format!("{} Error: {}", emoji::ERROR, msg),
            VaultError::Config(msg) => format!("{} Configuration error: {}", emoji::ERROR, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message() {
        let err = BotError::from(VaultError::Unauthorized {
            action: "upload videos",
        });
        assert_eq!(err.user_message(), "Only admins can upload videos.");
        assert!(err.subscribe_link().is_none());
    }

    #[test]
    fn test_subscription_required_carries_link() {
        let err = BotError::from(VaultError::SubscriptionRequired {
            channel: "@leafposting".to_string(),
            link: "https://t.me/leafposting".to_string(),
        });
        assert!(err.user_message().contains("@leafposting"));
        assert_eq!(err.subscribe_link(), Some("https://t.me/leafposting"));
    }

    #[test]
    fn test_check_failure_reads_differently_from_denial() {
        let denied = VaultError::SubscriptionRequired {
            channel: "@c".to_string(),
            link: "https://t.me/c".to_string(),
        };
        let failed = VaultError::MembershipCheckFailed {
            channel: "@c".to_string(),
            link: "https://t.me/c".to_string(),
            reason: "timeout".to_string(),
        };
        assert_ne!(denied.user_message(), failed.user_message());
        // Internal reason stays in the logs
        assert!(!failed.user_message().contains("timeout"));
    }

    #[test]
    fn test_not_found_is_verbatim() {
        assert_eq!(
            VaultError::DigestNotFound("abc".to_string()).user_message(),
            messages::HASH_NOT_FOUND
        );
        assert_eq!(
            VaultError::InvalidDigest("hello".to_string()).user_message(),
            messages::HASH_NOT_FOUND
        );
    }

    #[test]
    fn test_io_error_does_not_leak_paths() {
        let err = BotError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/videos/x.mp4",
        ));
        assert!(!err.user_message().contains("/srv"));
    }
}
