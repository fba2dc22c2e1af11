//! Constants used throughout the telegram bot

/// Characters of a digest shown in log lines
pub const HASH_DISPLAY_LENGTH: usize = 12;

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const WARNING: &str = "⚠️";
    pub const SPEED: &str = "⚡";
    pub const STORAGE: &str = "💾";
}

/// Fixed reply texts
pub mod messages {
    pub const WELCOME: &str = "Welcome! Send a video (admin only) to get its hash. \
        Use the hash to retrieve the video later.";
    pub const HASH_NOT_FOUND: &str = "Hash not found or incorrect hash!";
    pub const MEASURING_SPEED: &str = "Measuring speed, please wait...";
    pub const INVALID_STATE: &str = "Unable to handle the message. Type /help to see the usage.";
    pub const SUBSCRIBE_BUTTON: &str = "Subscribe to Channel";
    pub const RETRIEVE_BUTTON: &str = "Get Video by Hash";
}

/// Usage messages for commands
pub mod usage {
    pub const DELETE: &str = "Usage: /delete <video_hash>\n\nTip: The hash is in the upload confirmation.";
}
