//! ETag Minting
//!
//! Produces strong, quoted entity tags for freshly constructed cache entries.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

/// Number of hex characters kept from the content digest.
const CONTENT_HASH_LEN: usize = 32;

// == ETag Strategy ==
/// How a new entry's ETag is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EtagStrategy {
    /// Fresh random token per entry construction
    #[default]
    Random,
    /// Truncated SHA-256 of the payload's JSON serialization
    ContentHash,
}

impl EtagStrategy {
    // == Mint ==
    /// Mints a quoted ETag for `data`.
    ///
    /// `ContentHash` falls back to a random token when the payload cannot be
    /// serialized, so minting never fails.
    pub fn mint<T: Serialize>(&self, data: &T) -> String {
        match self {
            EtagStrategy::Random => random_tag(),
            EtagStrategy::ContentHash => match serde_json::to_vec(data) {
                Ok(bytes) => {
                    let digest = Sha256::digest(&bytes);
                    let hex = hex::encode(digest);
                    format!("\"{}\"", &hex[..CONTENT_HASH_LEN])
                }
                Err(err) => {
                    warn!("Payload not serializable, using random ETag: {}", err);
                    random_tag()
                }
            },
        }
    }
}

fn random_tag() -> String {
    format!("\"{}\"", Uuid::new_v4().simple())
}

impl FromStr for EtagStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(EtagStrategy::Random),
            "content-hash" | "content_hash" | "hash" => Ok(EtagStrategy::ContentHash),
            other => Err(format!("unknown ETag strategy: {}", other)),
        }
    }
}

impl fmt::Display for EtagStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtagStrategy::Random => write!(f, "random"),
            EtagStrategy::ContentHash => write!(f, "content-hash"),
        }
    }
}
