//! The single canonical-JSON encoder used by every hash and signature
//! pre-image in the workspace. Keys are sorted ascending, there is no
//! insignificant whitespace, and the encoding is otherwise ordinary JSON.
//! `serde_json::Value`'s `Object` variant is a `BTreeMap` as long as the
//! `preserve_order` feature is not enabled (it isn't, workspace-wide), so
//! converting through `Value` is sufficient to get sorted keys for free.
use crate::error::{CryptoError, Result};
use crate::hash::Hash256;
use serde::Serialize;

/// Serializes `value` to its canonical JSON byte representation.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let v = serde_json::to_value(value).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    serde_json::to_vec(&v).map_err(|e| CryptoError::Encoding(e.to_string()))
}

/// SHA-256 over the canonical JSON encoding of `value`.
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<Hash256> {
    Ok(Hash256::digest(&canonical_bytes(value)?))
}
