use thiserror::Error;

/// Errors produced by the vault core
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller lacks the admin role
    #[error("only the admin may {action}")]
    Unauthorized { action: &'static str },

    /// Caller is confirmed not to be a channel member
    #[error("subscription to {channel} required")]
    SubscriptionRequired { channel: String, link: String },

    /// The membership directory could not answer
    #[error("membership check against {channel} failed: {reason}")]
    MembershipCheckFailed {
        channel: String,
        link: String,
        reason: String,
    },

    /// No mapping exists for the digest
    #[error("digest {0} not found")]
    DigestNotFound(String),

    /// Input is not a 64 character hex digest
    #[error("invalid digest: {0:?}")]
    InvalidDigest(String),

    /// File read/write/removal error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The index file could not be encoded or decoded
    #[error("index persistence error: {0}")]
    Persistence(#[from] serde_json::Error),

    /// Speedtest or disk usage probe failure
    #[error("external service failure: {0}")]
    ExternalService(String),

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Whether the error is a lookup miss the caller should see verbatim
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VaultError::DigestNotFound(_) | VaultError::InvalidDigest(_)
        )
    }
}

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
