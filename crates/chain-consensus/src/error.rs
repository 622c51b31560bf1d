use thiserror::Error;

/// Errors raised by the coordinator's write endpoints. The HTTP façade maps
/// each variant to a fixed client-facing status without leaking any further
/// detail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("transaction is malformed: {0}")]
    MalformedTransaction(String),
    #[error("transaction signature is invalid")]
    InvalidSignature,
    #[error("sender address does not match the signing public key")]
    AddressMismatch,
    #[error("a transaction with this hash is already queued or committed")]
    DuplicateTransaction,
    #[error("sequence mismatch: expected {expected}")]
    SequenceMismatch { expected: u64 },
    #[error("sender balance is insufficient for this transfer")]
    InsufficientBalance,
    #[error("a consensus round is already in progress")]
    RoundInProgress,
    #[error("the pending queue is empty")]
    Empty,
    #[error("block height does not equal latestHeight + 1")]
    WrongHeight,
    #[error("block prevHash does not equal latestHash")]
    WrongParent,
    #[error("fewer than the required number of valid signatures were supplied")]
    InsufficientSignatures,
    #[error("proposer signature does not verify against the configured proposer public key")]
    InvalidProposerSignature,
    #[error("chain is already initialised")]
    AlreadyInitialised,
    #[error("backup cid does not match the most recent index entry")]
    CidMismatch,
    #[error("core error: {0}")]
    Core(#[from] chain_core::CoreError),
    #[error("transport error talking to a remote coordinator: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Errors a proposer's `trigger` handler can return. None of these halt the
/// chain; the caller always sees the lock released before the error surfaces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProposerError {
    #[error("{0}")]
    Coordinator(#[from] CoordinatorError),
    #[error("only {received} of {required} required validator signatures were collected: {detail:?}")]
    InsufficientSignatures {
        required: usize,
        received: usize,
        detail: Vec<String>,
    },
}

/// Errors a validator's `/validate` handler can return. Any of these means
/// the validator casts a negative vote, not a hard failure — the proposer
/// simply doesn't get that signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("block hash does not match its header")]
    BadHash,
    #[error("transaction count does not match header.txCount")]
    TxCountMismatch,
    #[error("transaction root does not match header.txRoot")]
    BadTxRoot,
    #[error("state root does not match header.stateRoot")]
    BadStateRoot,
    #[error("block timestamp is too far in the future")]
    TimestampTooFarInFuture,
    #[error("transaction timestamp is too far in the future")]
    TransactionTimestampTooFarInFuture,
    #[error("transaction amount or signature is malformed")]
    MalformedTransaction,
    #[error("block height does not equal latestHeight + 1")]
    WrongHeight,
    #[error("block prevHash does not equal latestHash")]
    WrongParent,
    #[error("core error: {0}")]
    Core(#[from] chain_core::CoreError),
}
