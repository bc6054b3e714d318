//! Canonical encoding and sealing.
//!
//! A seal is the lowercase hex SHA3-256 digest of
//! `"ISO16-SEAL-V1:" || canonical_bytes`. The prefix carries the protocol
//! version; the body has no version tag of its own. See [`encoding`] for the
//! body layout and [`keccak`] for the digest.
//!
//! # Example
//!
//! ```
//! use iso16_core::seal::{Seal, seal_canonical};
//!
//! let seal = seal_canonical(b"");
//! assert_eq!(seal.as_str().len(), 64);
//! assert_eq!(Seal::parse(seal.as_str()).unwrap(), seal);
//! ```

pub mod encoding;
pub mod keccak;

#[cfg(test)]
mod proptest_seal;

use std::fmt;

pub use encoding::{
    CanonicalEncoder, DEFAULT_IMPLEMENTATION_ID, EncodingError, MAX_SHORT_STRING_LEN, NONCE_LEN,
    Nonce, SealInput, SealMetadata, encode, encode_plugin, parse_nonce,
};
pub use keccak::{DIGEST_LEN, Sha3_256};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Domain separation prefix hashed ahead of the canonical bytes.
pub const SEAL_PREFIX: &[u8] = b"ISO16-SEAL-V1:";

/// Length of a seal in hex characters.
pub const SEAL_HEX_LEN: usize = DIGEST_LEN * 2;

/// A seal string that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SealParseError {
    /// Wrong number of characters.
    #[error("seal must be {SEAL_HEX_LEN} hex characters, got {0}")]
    Length(usize),

    /// A character outside `0-9a-f`.
    #[error("seal contains invalid character {character:?} at position {position}")]
    InvalidCharacter {
        /// Offending character.
        character: char,
        /// Character index.
        position: usize,
    },
}

/// Lowercase hex SHA3-256 seal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Seal(String);

impl Seal {
    /// Renders a digest.
    #[must_use]
    pub fn from_digest(digest: &[u8; DIGEST_LEN]) -> Self {
        Self(hex::encode(digest))
    }

    /// Validates a seal string.
    ///
    /// Upper-case hex is rejected; seals are compared as exact strings.
    ///
    /// # Errors
    ///
    /// Returns [`SealParseError`] if `text` is not exactly
    /// [`SEAL_HEX_LEN`] lowercase hex characters.
    pub fn parse(text: &str) -> Result<Self, SealParseError> {
        if let Some((position, character)) = text
            .chars()
            .enumerate()
            .find(|(_, c)| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(SealParseError::InvalidCharacter {
                character,
                position,
            });
        }
        if text.len() != SEAL_HEX_LEN {
            return Err(SealParseError::Length(text.len()));
        }
        Ok(Self(text.to_string()))
    }

    /// The hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Seal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Seal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Seals already-encoded canonical bytes.
#[must_use]
pub fn seal_canonical(canonical: &[u8]) -> Seal {
    let mut hasher = Sha3_256::new();
    hasher.update(SEAL_PREFIX);
    hasher.update(canonical);
    Seal::from_digest(&hasher.finalize())
}

/// Encodes `input` and seals the result.
///
/// # Errors
///
/// Returns [`EncodingError`] if the run cannot be canonically encoded.
pub fn compute_seal(input: &SealInput<'_>) -> Result<Seal, EncodingError> {
    let canonical = encode(input)?;
    Ok(seal_canonical(&canonical))
}
