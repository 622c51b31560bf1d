use chain_consensus::CoordinatorError;
use warp::http::StatusCode;

/// The client-facing error surface, each variant carrying a fixed HTTP
/// status. Never wraps an internal error's text beyond what's already safe
/// to show a client.
#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("request body is malformed")]
    MalformedRequest,
    #[error("signature is invalid")]
    InvalidSignature,
    #[error("from address does not match the signing public key")]
    AddressMismatch,
    #[error("transaction already submitted")]
    DuplicateTransaction,
    #[error("sequence mismatch, expected {expected}")]
    SequenceMismatch { expected: u64 },
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("block not found")]
    BlockNotFound,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("chain is already initialised")]
    AlreadyInitialised,
    #[error("faucet is disabled on this network")]
    FaucetDisabled,
    #[error("internal server error")]
    Internal,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::MalformedRequest => StatusCode::BAD_REQUEST,
            RpcError::InvalidSignature => StatusCode::UNAUTHORIZED,
            RpcError::AddressMismatch => StatusCode::BAD_REQUEST,
            RpcError::DuplicateTransaction => StatusCode::BAD_REQUEST,
            RpcError::SequenceMismatch { .. } => StatusCode::BAD_REQUEST,
            RpcError::InsufficientBalance => StatusCode::BAD_REQUEST,
            RpcError::BlockNotFound | RpcError::TransactionNotFound => StatusCode::NOT_FOUND,
            RpcError::AlreadyInitialised => StatusCode::CONFLICT,
            RpcError::FaucetDisabled => StatusCode::FORBIDDEN,
            RpcError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoordinatorError> for RpcError {
    fn from(e: CoordinatorError) -> Self {
        match e {
            CoordinatorError::MalformedTransaction(_) => RpcError::MalformedRequest,
            CoordinatorError::InvalidSignature => RpcError::InvalidSignature,
            CoordinatorError::AddressMismatch => RpcError::AddressMismatch,
            CoordinatorError::DuplicateTransaction => RpcError::DuplicateTransaction,
            CoordinatorError::SequenceMismatch { expected } => RpcError::SequenceMismatch { expected },
            CoordinatorError::InsufficientBalance => RpcError::InsufficientBalance,
            CoordinatorError::AlreadyInitialised => RpcError::AlreadyInitialised,
            _ => RpcError::Internal,
        }
    }
}
