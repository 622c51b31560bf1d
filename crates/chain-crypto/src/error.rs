use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidHashLength(usize),
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidAddressLength(usize),
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("canonical encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
