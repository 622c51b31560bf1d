use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A fixed-width 32-byte hash, rendered at the wire boundary as `0x`-prefixed
/// lower-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidHashLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// SHA-256 over arbitrary bytes.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let out = hasher.finalize();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&out);
        Self(arr)
    }

    /// `SHA-256(left || right)`, used for internal Merkle nodes.
    pub fn combine(left: &Hash256, right: &Hash256) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&left.0);
        buf.extend_from_slice(&right.0);
        Self::digest(&buf)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash256 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Hash256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = Hash256::digest(b"hello");
        let hex = h.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Hash256::from_hex(&hex).unwrap(), h);
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(Hash256::digest(b"abc"), Hash256::digest(b"abc"));
        assert_ne!(Hash256::digest(b"abc"), Hash256::digest(b"abd"));
    }

    #[test]
    fn rejects_wrong_length() {
        let bad = hex::encode([0u8; 16]);
        assert!(Hash256::from_hex(&bad).is_err());
    }
}
