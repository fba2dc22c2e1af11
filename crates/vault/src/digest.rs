//! Content digest newtype

use crate::error::{VaultError, VaultResult};
use std::fmt;
use std::str::FromStr;

/// Length of a hex encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a file's full content.
///
/// Construction always validates the format, so a `Digest` can be used as a
/// map key or filename component without further checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(String);

impl Digest {
    /// Parse user supplied text into a digest
    ///
    /// Surrounding whitespace is ignored and uppercase hex is folded to
    /// lowercase. Anything else that is not exactly 64 hex characters is
    /// rejected.
    pub fn parse(text: &str) -> VaultResult<Self> {
        let candidate = text.trim();
        if candidate.len() != DIGEST_HEX_LEN || !candidate.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VaultError::InvalidDigest(candidate.to_string()));
        }
        Ok(Digest(candidate.to_ascii_lowercase()))
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Digest(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::parse(s)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
