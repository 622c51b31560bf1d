/// Errors raised building or loading a wallet-side key/transaction, as
/// distinct from `chain_core::CoreError` (which only ever sees transactions
/// that already claim to be well-formed).
#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("invalid private key seed")]
    InvalidKey,
    #[error("invalid address")]
    InvalidAddress,
    #[error("failed to build transaction pre-image: {0}")]
    Preimage(#[from] chain_core::error::CoreError),
}
