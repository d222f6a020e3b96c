//! Content hashing for instructions
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest over an
//! instruction's semantic content (`function_name` + `requirements`).
//! It detects tampering and drift; it is never the record identifier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 content digest
///
/// Serialized as a 64-char hex string in record documents. Immutable
/// and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash an instruction's semantic content
    ///
    /// The digest covers a canonical JSON encoding of
    /// `{function_name, requirements}`. Object keys serialize in sorted
    /// order (serde_json without `preserve_order`), so equal content
    /// always produces an equal digest regardless of insertion order.
    ///
    /// # Errors
    /// Returns error if `requirements` cannot be serialized.
    pub fn of_content(function_name: &str, requirements: &Value) -> Result<Self, HashError> {
        #[derive(Serialize)]
        struct Content<'a> {
            function_name: &'a str,
            requirements: &'a Value,
        }
        let canonical = serde_json::to_vec(&Content {
            function_name,
            requirements,
        })?;
        Ok(Self::compute(&canonical))
    }

    /// First 16 hex chars, for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors from hashing or decoding digests
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Decoded digest was not 32 bytes
    #[error("invalid digest length: expected 32, got {0}")]
    InvalidLength(usize),

    /// Hex decoding failed
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Content serialization failed
    #[error("content serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
