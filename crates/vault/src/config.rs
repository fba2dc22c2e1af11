//! Process configuration read from the environment
//!
//! One `Config` is built at start-up and its sections are handed to the
//! store, the access gate, the HTTP server and the probes.

use crate::error::{VaultError, VaultResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which `HashIndex` variant backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// One JSON file shared by every chat
    Persistent,
    /// Most recent upload per chat, in memory only
    Session,
}

impl FromStr for IndexMode {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "persistent" | "json" => Ok(IndexMode::Persistent),
            "session" => Ok(IndexMode::Session),
            _ => Err(VaultError::Config(format!("Invalid INDEX_MODE: {}", s))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding uploaded videos
    pub video_dir: PathBuf,
    /// JSON file holding the digest mapping
    pub index_file: PathBuf,
    pub index_mode: IndexMode,
}

#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// The single identity allowed to upload and delete
    pub admin_user_id: u64,
    /// Channel users must be subscribed to, e.g. `@leafposting`
    pub channel_username: String,
    /// Whether digest retrieval requires a subscription
    pub gate_retrieval: bool,
    /// Upper bound on one membership lookup
    pub membership_timeout: Duration,
}

impl AccessConfig {
    /// Public link to the required channel
    pub fn channel_link(&self) -> String {
        format!(
            "https://t.me/{}",
            self.channel_username.trim_start_matches('@')
        )
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Serve raw video bytes under `/video/{digest}/raw`
    pub serve_files: bool,
}

#[derive(Debug, Clone)]
pub struct SpeedtestConfig {
    pub download_url: String,
    pub upload_url: String,
    pub upload_bytes: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub access: AccessConfig,
    pub http: HttpConfig,
    pub speedtest: SpeedtestConfig,
    /// Path whose filesystem `/local` reports on
    pub disk_usage_path: PathBuf,
}

const DEFAULT_SPEEDTEST_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down?bytes=25000000";
const DEFAULT_SPEEDTEST_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";
const DEFAULT_SPEEDTEST_UPLOAD_BYTES: usize = 10_000_000;

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> VaultResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> VaultResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VaultError::Config(format!("{} must be set", key)))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let admin_user_id = required("ADMIN_USER_ID")?
            .trim()
            .parse::<u64>()
            .map_err(|e| VaultError::Config(format!("Invalid ADMIN_USER_ID: {}", e)))?;

        let mut channel_username = required("CHANNEL_USERNAME")?.trim().to_string();
        if !channel_username.starts_with('@') {
            channel_username.insert(0, '@');
        }

        let config = Config {
            store: StoreConfig {
                video_dir: PathBuf::from(or_default("VIDEO_DIRECTORY", "videos")),
                index_file: PathBuf::from(or_default("HASH_DATA_FILE", "video_hashes.json")),
                index_mode: or_default("INDEX_MODE", "persistent").parse()?,
            },
            access: AccessConfig {
                admin_user_id,
                channel_username,
                gate_retrieval: parse_flag("GATE_RETRIEVAL", &or_default("GATE_RETRIEVAL", "true"))?,
                membership_timeout: Duration::from_secs(parse_number(
                    "MEMBERSHIP_TIMEOUT_SECS",
                    &or_default("MEMBERSHIP_TIMEOUT_SECS", "10"),
                )?),
            },
            http: HttpConfig {
                enabled: parse_flag("HTTP_ENABLED", &or_default("HTTP_ENABLED", "true"))?,
                host: or_default("HTTP_HOST", "0.0.0.0"),
                port: parse_number("HTTP_PORT", &or_default("HTTP_PORT", "8080"))?,
                serve_files: parse_flag("HTTP_SERVE_FILES", &or_default("HTTP_SERVE_FILES", "false"))?,
            },
            speedtest: SpeedtestConfig {
                download_url: or_default("SPEEDTEST_DOWNLOAD_URL", DEFAULT_SPEEDTEST_DOWNLOAD_URL),
                upload_url: or_default("SPEEDTEST_UPLOAD_URL", DEFAULT_SPEEDTEST_UPLOAD_URL),
                upload_bytes: parse_number(
                    "SPEEDTEST_UPLOAD_BYTES",
                    &or_default("SPEEDTEST_UPLOAD_BYTES", &DEFAULT_SPEEDTEST_UPLOAD_BYTES.to_string()),
                )?,
                timeout: Duration::from_secs(parse_number(
                    "SPEEDTEST_TIMEOUT_SECS",
                    &or_default("SPEEDTEST_TIMEOUT_SECS", "60"),
                )?),
            },
            disk_usage_path: PathBuf::from(or_default("DISK_USAGE_PATH", ".")),
        };

        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> VaultResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(VaultError::Config(format!("Invalid {}: {}", key, other))),
    }
}

fn parse_number<T>(key: &str, value: &str) -> VaultResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| VaultError::Config(format!("Invalid {}: {}", key, e)))
}
