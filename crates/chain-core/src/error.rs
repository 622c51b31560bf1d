use thiserror::Error;

/// Domain-level errors raised while constructing or validating a
/// transaction or block, independent of any particular coordinator round.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("transaction hash does not match its canonical pre-image")]
    BadTransactionHash,
    #[error("sender address does not match the public key that signed the transaction")]
    AddressMismatch,
    #[error("transaction signature is invalid")]
    InvalidSignature,
    #[error("block hash does not match its canonical header pre-image")]
    BadHash,
    #[error("transaction count does not match header.txCount")]
    TxCountMismatch,
    #[error("transaction root does not match header.txRoot")]
    BadTxRoot,
    #[error("state root does not match header.stateRoot")]
    BadStateRoot,
    #[error("block timestamp is too far in the future")]
    TimestampTooFarInFuture,
    #[error("crypto error: {0}")]
    Crypto(#[from] chain_crypto::CryptoError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
