//! Wire types for the internal Coordinator↔Proposer/Validator HTTP transport.
//! Every `InternalApi` method gets a request/response pair here; errors are
//! round-tripped losslessly since these are trusted peer endpoints, unlike
//! the client-facing façade in `chain-rpc` which must not leak internals.

use chain_consensus::{CommitSummary, CoordinatorError, TransactionRecord, TransactionStatus};
use chain_core::{Block, ChainSnapshot, GenesisConfig, NodeId, Transaction};
use chain_crypto::{Address, Hash256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum CoordinatorErrorDto {
    MalformedTransaction(String),
    InvalidSignature,
    AddressMismatch,
    DuplicateTransaction,
    SequenceMismatch { expected: u64 },
    InsufficientBalance,
    RoundInProgress,
    Empty,
    WrongHeight,
    WrongParent,
    InsufficientSignatures,
    AlreadyInitialised,
    CidMismatch,
    InvalidProposerSignature,
    Core(String),
    Transport(String),
}

impl From<&CoordinatorError> for CoordinatorErrorDto {
    fn from(e: &CoordinatorError) -> Self {
        match e {
            CoordinatorError::MalformedTransaction(m) => Self::MalformedTransaction(m.clone()),
            CoordinatorError::InvalidSignature => Self::InvalidSignature,
            CoordinatorError::AddressMismatch => Self::AddressMismatch,
            CoordinatorError::DuplicateTransaction => Self::DuplicateTransaction,
            CoordinatorError::SequenceMismatch { expected } => Self::SequenceMismatch { expected: *expected },
            CoordinatorError::InsufficientBalance => Self::InsufficientBalance,
            CoordinatorError::RoundInProgress => Self::RoundInProgress,
            CoordinatorError::Empty => Self::Empty,
            CoordinatorError::WrongHeight => Self::WrongHeight,
            CoordinatorError::WrongParent => Self::WrongParent,
            CoordinatorError::InsufficientSignatures => Self::InsufficientSignatures,
            CoordinatorError::AlreadyInitialised => Self::AlreadyInitialised,
            CoordinatorError::CidMismatch => Self::CidMismatch,
            CoordinatorError::InvalidProposerSignature => Self::InvalidProposerSignature,
            CoordinatorError::Core(e) => Self::Core(e.to_string()),
            CoordinatorError::Transport(m) => Self::Transport(m.clone()),
        }
    }
}

impl From<CoordinatorErrorDto> for CoordinatorError {
    fn from(dto: CoordinatorErrorDto) -> Self {
        match dto {
            CoordinatorErrorDto::MalformedTransaction(m) => Self::MalformedTransaction(m),
            CoordinatorErrorDto::InvalidSignature => Self::InvalidSignature,
            CoordinatorErrorDto::AddressMismatch => Self::AddressMismatch,
            CoordinatorErrorDto::DuplicateTransaction => Self::DuplicateTransaction,
            CoordinatorErrorDto::SequenceMismatch { expected } => Self::SequenceMismatch { expected },
            CoordinatorErrorDto::InsufficientBalance => Self::InsufficientBalance,
            CoordinatorErrorDto::RoundInProgress => Self::RoundInProgress,
            CoordinatorErrorDto::Empty => Self::Empty,
            CoordinatorErrorDto::WrongHeight => Self::WrongHeight,
            CoordinatorErrorDto::WrongParent => Self::WrongParent,
            CoordinatorErrorDto::InsufficientSignatures => Self::InsufficientSignatures,
            CoordinatorErrorDto::AlreadyInitialised => Self::AlreadyInitialised,
            CoordinatorErrorDto::CidMismatch => Self::CidMismatch,
            CoordinatorErrorDto::InvalidProposerSignature => Self::InvalidProposerSignature,
            CoordinatorErrorDto::Core(m) => Self::Transport(format!("remote core error: {m}")),
            CoordinatorErrorDto::Transport(m) => Self::Transport(m),
        }
    }
}

pub type WireResult<T> = Result<T, CoordinatorErrorDto>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTransactionRequest {
    pub tx: Transaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireLockResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseLockRequest {
    pub clear_queue: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackBlockRequest {
    pub proposer_id: NodeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitBlockRequest {
    pub block: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummaryDto {
    pub height: u64,
    pub hash: Hash256,
    pub tx_count: u64,
    pub elapsed_ms: u64,
}

impl From<CommitSummary> for CommitSummaryDto {
    fn from(s: CommitSummary) -> Self {
        Self { height: s.height, hash: s.hash, tx_count: s.tx_count, elapsed_ms: s.elapsed_ms }
    }
}

impl From<CommitSummaryDto> for CommitSummary {
    fn from(s: CommitSummaryDto) -> Self {
        Self { height: s.height, hash: s.hash, tx_count: s.tx_count, elapsed_ms: s.elapsed_ms }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksRangeRequest {
    pub start: u64,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum TransactionStatusDto {
    Pending,
    Committed { height: u64 },
}

impl From<TransactionStatus> for TransactionStatusDto {
    fn from(s: TransactionStatus) -> Self {
        match s {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Committed { height } => Self::Committed { height },
        }
    }
}

impl From<TransactionStatusDto> for TransactionStatus {
    fn from(s: TransactionStatusDto) -> Self {
        match s {
            TransactionStatusDto::Pending => Self::Pending,
            TransactionStatusDto::Committed { height } => Self::Committed { height },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecordDto {
    pub transaction: Transaction,
    pub status: TransactionStatusDto,
}

impl From<TransactionRecord> for TransactionRecordDto {
    fn from(r: TransactionRecord) -> Self {
        Self { transaction: r.transaction, status: r.status.into() }
    }
}

impl From<TransactionRecordDto> for TransactionRecord {
    fn from(r: TransactionRecordDto) -> Self {
        Self { transaction: r.transaction, status: r.status.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressParam {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashParam {
    pub hash: Hash256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportErrorRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitGenesisRequest {
    pub genesis: GenesisConfig,
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreSnapshotRequest {
    pub snapshot: ChainSnapshot,
    pub cid: String,
    pub force: bool,
}
