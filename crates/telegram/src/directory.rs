//! Channel membership lookups through the Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient, UserId};
use vault::{DirectoryError, MembershipDirectory, MembershipStatus};

/// `getChatMember` backed membership directory.
///
/// The bot has to be an administrator of the channel, otherwise every
/// lookup fails and callers see a check failure rather than a denial.
#[derive(Clone)]
pub struct TelegramDirectory {
    bot: Bot,
}

impl TelegramDirectory {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Map a Bot API member kind onto the statuses the gate understands
pub fn membership_from_kind(kind: &ChatMemberKind) -> MembershipStatus {
    match kind {
        ChatMemberKind::Owner { .. } => MembershipStatus::Owner,
        ChatMemberKind::Administrator { .. } => MembershipStatus::Administrator,
        ChatMemberKind::Member { .. } => MembershipStatus::Member,
        _ => MembershipStatus::None,
    }
}

#[async_trait]
impl MembershipDirectory for TelegramDirectory {
    async fn membership_status(
        &self,
        channel: &str,
        user_id: u64,
    ) -> Result<MembershipStatus, DirectoryError> {
        let member = self
            .bot
            .get_chat_member(Recipient::ChannelUsername(channel.to_string()), UserId(user_id))
            .await
            .map_err(|e| DirectoryError(e.to_string()))?;

        let status = membership_from_kind(&member.kind);
        tracing::debug!(user_id, channel, ?status, "Resolved channel membership");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_states() {
        assert_eq!(membership_from_kind(&ChatMemberKind::Member), MembershipStatus::Member);
        assert_eq!(membership_from_kind(&ChatMemberKind::Left), MembershipStatus::None);
    }
}
