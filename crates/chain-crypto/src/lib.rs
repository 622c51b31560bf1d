//! Cryptographic primitives shared by every role: hashing, canonical JSON,
//! Merkle roots, Ed25519 signing/verification, and address derivation.
//!
//! This crate is the one place the canonical encoder lives — proposer,
//! validator and coordinator must all hash and sign through it, or their
//! computed roots will silently diverge (see the workspace design notes on
//! determinism across roles).

pub mod address;
pub mod amount;
pub mod canonical;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod signature;

pub use address::Address;
pub use amount::Amount;
pub use canonical::{canonical_bytes, hash_canonical};
pub use error::{CryptoError, Result};
pub use hash::Hash256;
pub use merkle::merkle_root;
pub use signature::{verify, KeyPair, PublicKey, SignatureBytes};
