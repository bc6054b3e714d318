//! Canonical byte encoding of a complete run.
//!
//! # Layout
//!
//! Fields are concatenated with no framing, in this order:
//!
//! | # | Field                | Encoding                                        |
//! |---|----------------------|-------------------------------------------------|
//! | 1 | initial phase state  | 16 x (x, y, z) as big-endian `i32`              |
//! | 2 | plugin records       | sorted by identifier bytes, see below           |
//! | 3 | warp total           | 3 x big-endian `i32`                            |
//! | 4 | error total          | big-endian `i32`                                |
//! | 5 | warped phase state   | same as field 1                                 |
//! | 6 | decision flags       | `symmetry_ok`, `error_ok`, `true_delivery` byte |
//! | 7 | implementation id    | raw UTF-8, no prefix, no terminator             |
//! | 8 | timestamp            | big-endian `u64`                                |
//! | 9 | nonce                | 16 raw bytes                                    |
//!
//! A plugin record is `len(id) || id || domain_code || warp (3 x i32) ||
//! error (i32) || len(version) || version`, where each length is one byte.
//!
//! Plugins are sorted by identifier so the encoding does not depend on the
//! order results were supplied in. Records with equal identifiers are
//! ordered by their encoded bytes, which keeps the output a function of the
//! result multiset alone.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::engine::{Decision, WarpTotals};
use crate::fixed_point::Q16;
use crate::phase::{PhaseState, PhaseVector};
use crate::plugin::PluginResult;

/// Longest identifier or version string a record can carry.
pub const MAX_SHORT_STRING_LEN: usize = u8::MAX as usize;

/// Length of the run nonce in bytes.
pub const NONCE_LEN: usize = 16;

/// Implementation identifier used when none is configured.
pub const DEFAULT_IMPLEMENTATION_ID: &str = "iso16-ref";

/// Encoded size of one phase state.
pub const PHASE_STATE_ENCODED_LEN: usize = crate::phase::PHASE_ENTRIES * 3 * 4;

/// Run nonce.
pub type Nonce = [u8; NONCE_LEN];

/// Errors produced while building the canonical encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A length-prefixed string does not fit its one-byte prefix.
    #[error("{field} is {len} bytes, canonical encoding allows at most {max}")]
    StringTooLong {
        /// Which field overflowed.
        field: &'static str,
        /// Actual UTF-8 length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Caller-supplied metadata bound into the seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealMetadata {
    /// Free-form implementation identifier.
    pub implementation_id: String,
    /// Microseconds since the Unix epoch, or any caller-chosen value.
    pub timestamp: u64,
    /// Per-run nonce.
    #[serde(serialize_with = "serialize_nonce", deserialize_with = "deserialize_nonce")]
    pub nonce: Nonce,
}

impl Default for SealMetadata {
    fn default() -> Self {
        Self {
            implementation_id: DEFAULT_IMPLEMENTATION_ID.to_string(),
            timestamp: 0,
            nonce: [0; NONCE_LEN],
        }
    }
}

fn serialize_nonce<S: Serializer>(nonce: &Nonce, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(nonce))
}

fn deserialize_nonce<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Nonce, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_nonce(&text).map_err(serde::de::Error::custom)
}

/// Parses a nonce from exactly 32 hex characters.
///
/// # Errors
///
/// Returns a description of the problem if `text` is not valid hex or does
/// not decode to [`NONCE_LEN`] bytes.
pub fn parse_nonce(text: &str) -> Result<Nonce, String> {
    let bytes = hex::decode(text).map_err(|e| format!("nonce is not valid hex: {e}"))?;
    Nonce::try_from(bytes.as_slice()).map_err(|_| {
        format!(
            "nonce must be {NONCE_LEN} bytes ({} hex characters), got {} bytes",
            NONCE_LEN * 2,
            bytes.len()
        )
    })
}

/// Everything a seal commits to, borrowed from the run that produced it.
#[derive(Debug, Clone, Copy)]
pub struct SealInput<'a> {
    /// Phase state before warping.
    pub initial: &'a PhaseState,
    /// Plugin results in any order.
    pub plugins: &'a [PluginResult],
    /// Aggregated warp and error.
    pub totals: &'a WarpTotals,
    /// Phase state after warping.
    pub warped: &'a PhaseState,
    /// Final verdicts.
    pub decision: Decision,
    /// Implementation id, timestamp and nonce.
    pub metadata: &'a SealMetadata,
}

/// Append-only writer for canonical fields.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Creates an empty encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates an encoder with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends a big-endian Q16.16 value.
    pub fn put_q16(&mut self, value: Q16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends `x`, `y`, `z`.
    pub fn put_vector(&mut self, vector: PhaseVector) {
        self.put_q16(vector.x);
        self.put_q16(vector.y);
        self.put_q16(vector.z);
    }

    /// Appends every entry of `state` in index order.
    pub fn put_state(&mut self, state: &PhaseState) {
        for entry in state.iter() {
            self.put_vector(*entry);
        }
    }

    /// Appends `0x01` or `0x00`.
    pub fn put_bool(&mut self, flag: bool) {
        self.buf.push(u8::from(flag));
    }

    /// Appends a big-endian `u64`.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends bytes verbatim.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a one-byte length followed by the UTF-8 bytes of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::StringTooLong`] if `value` is longer than
    /// [`MAX_SHORT_STRING_LEN`] bytes. Nothing is written in that case.
    pub fn put_short_str(&mut self, field: &'static str, value: &str) -> Result<(), EncodingError> {
        let len = u8::try_from(value.len()).map_err(|_| EncodingError::StringTooLong {
            field,
            len: value.len(),
            max: MAX_SHORT_STRING_LEN,
        })?;
        self.buf.push(len);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the encoder.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encodes a single plugin record.
///
/// # Errors
///
/// Returns [`EncodingError::StringTooLong`] if the identifier or version is
/// longer than [`MAX_SHORT_STRING_LEN`] bytes.
pub fn encode_plugin(result: &PluginResult) -> Result<Vec<u8>, EncodingError> {
    let mut encoder =
        CanonicalEncoder::with_capacity(2 + result.id().len() + 1 + 16 + result.version().len());
    encoder.put_short_str("plugin identifier", result.id())?;
    encoder.put_raw(&[result.domain().code()]);
    encoder.put_vector(result.warp());
    encoder.put_q16(result.error());
    encoder.put_short_str("plugin version", result.version())?;
    Ok(encoder.into_bytes())
}

/// Encodes a complete run.
///
/// # Errors
///
/// Returns [`EncodingError::StringTooLong`] if any plugin identifier or
/// version cannot be length-prefixed.
pub fn encode(input: &SealInput<'_>) -> Result<Vec<u8>, EncodingError> {
    let mut records = input
        .plugins
        .iter()
        .map(|result| encode_plugin(result).map(|record| (result.id().as_bytes(), record)))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort();

    let records_len: usize = records.iter().map(|(_, record)| record.len()).sum();
    let mut encoder = CanonicalEncoder::with_capacity(
        2 * PHASE_STATE_ENCODED_LEN
            + records_len
            + 16
            + 3
            + input.metadata.implementation_id.len()
            + 8
            + NONCE_LEN,
    );

    encoder.put_state(input.initial);
    for (_, record) in &records {
        encoder.put_raw(record);
    }
    encoder.put_vector(input.totals.warp);
    encoder.put_q16(input.totals.error);
    encoder.put_state(input.warped);
    for flag in input.decision.flags() {
        encoder.put_bool(flag);
    }
    encoder.put_raw(input.metadata.implementation_id.as_bytes());
    encoder.put_u64(input.metadata.timestamp);
    encoder.put_raw(&input.metadata.nonce);

    Ok(encoder.into_bytes())
}
