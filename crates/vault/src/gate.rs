//! Access gate: admin identity and channel subscription checks

use crate::config::AccessConfig;
use crate::error::{VaultError, VaultResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Membership of a user in the required channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    Administrator,
    Owner,
    /// Left, banned, restricted or never joined
    None,
}

impl MembershipStatus {
    pub fn is_subscribed(self) -> bool {
        !matches!(self, MembershipStatus::None)
    }
}

/// Failure of the external membership lookup itself
#[derive(Debug, Clone)]
pub struct DirectoryError(pub String);

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DirectoryError {}

/// External service answering channel membership queries
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    async fn membership_status(
        &self,
        channel: &str,
        user_id: u64,
    ) -> Result<MembershipStatus, DirectoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Subscriber,
}

/// Operations a caller can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Upload,
    Retrieve,
    Delete,
    Speedtest,
    DiskUsage,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Start => "start the bot",
            Action::Upload => "upload videos",
            Action::Retrieve => "retrieve videos",
            Action::Delete => "delete videos",
            Action::Speedtest => "run speed tests",
            Action::DiskUsage => "check storage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAdmin,
    NotSubscribed,
}

/// Outcome of a single role check
#[derive(Debug, Clone)]
pub enum Authorization {
    Allowed,
    Denied(DenyReason),
    CheckFailed(DirectoryError),
}

/// Decides whether a caller may perform an action
#[derive(Clone)]
pub struct AccessGate {
    config: AccessConfig,
    directory: Arc<dyn MembershipDirectory>,
}

impl AccessGate {
    pub fn new(config: AccessConfig, directory: Arc<dyn MembershipDirectory>) -> Self {
        Self { config, directory }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        user_id == self.config.admin_user_id
    }

    /// Check one role
    pub async fn authorize(&self, user_id: u64, role: Role) -> Authorization {
        match role {
            Role::Admin if self.is_admin(user_id) => Authorization::Allowed,
            Role::Admin => Authorization::Denied(DenyReason::NotAdmin),
            Role::Subscriber => self.check_subscription(user_id).await,
        }
    }

    /// Roles needed for an action, checked in order
    pub fn required_roles(&self, action: Action) -> &'static [Role] {
        match action {
            Action::Upload | Action::Delete | Action::Speedtest => &[Role::Admin, Role::Subscriber],
            Action::Retrieve if !self.config.gate_retrieval => &[],
            Action::Start | Action::Retrieve | Action::DiskUsage => &[Role::Subscriber],
        }
    }

    /// Check every role an action needs, stopping at the first refusal
    pub async fn require(&self, user_id: u64, action: Action) -> VaultResult<()> {
        for &role in self.required_roles(action) {
            match self.authorize(user_id, role).await {
                Authorization::Allowed => {}
                Authorization::Denied(DenyReason::NotAdmin) => {
                    tracing::info!(user_id, ?action, "Rejected non-admin caller");
                    return Err(VaultError::Unauthorized { action: action.verb() });
                }
                Authorization::Denied(DenyReason::NotSubscribed) => {
                    tracing::info!(user_id, ?action, "Rejected caller without subscription");
                    return Err(VaultError::SubscriptionRequired {
                        channel: self.config.channel_username.clone(),
                        link: self.config.channel_link(),
                    });
                }
                Authorization::CheckFailed(err) => {
                    tracing::warn!(user_id, ?action, error = %err, "Membership lookup failed");
                    return Err(VaultError::MembershipCheckFailed {
                        channel: self.config.channel_username.clone(),
                        link: self.config.channel_link(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn check_subscription(&self, user_id: u64) -> Authorization {
        let lookup = self
            .directory
            .membership_status(&self.config.channel_username, user_id);

        match tokio::time::timeout(self.config.membership_timeout, lookup).await {
            Ok(Ok(status)) if status.is_subscribed() => Authorization::Allowed,
            Ok(Ok(_)) => Authorization::Denied(DenyReason::NotSubscribed),
            Ok(Err(err)) => Authorization::CheckFailed(err),
            Err(_) => Authorization::CheckFailed(DirectoryError(format!(
                "membership lookup timed out after {:?}",
                self.config.membership_timeout
            ))),
        }
    }
}

/// Directory backed by a fixed table, used by tests and local runs
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    members: std::collections::HashMap<u64, MembershipStatus>,
    failing: bool,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, user_id: u64, status: MembershipStatus) -> Self {
        self.members.insert(user_id, status);
        self
    }

    /// Every lookup fails, as if the service were unreachable
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl MembershipDirectory for StaticDirectory {
    async fn membership_status(
        &self,
        _channel: &str,
        user_id: u64,
    ) -> Result<MembershipStatus, DirectoryError> {
        if self.failing {
            return Err(DirectoryError("directory unavailable".to_string()));
        }
        Ok(self
            .members
            .get(&user_id)
            .copied()
            .unwrap_or(MembershipStatus::None))
    }
}
