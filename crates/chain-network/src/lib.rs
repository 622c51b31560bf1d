//! HTTP transport for the Coordinator↔Proposer/Validator internal API,
//! used only when those roles run in separate processes — the only
//! process-splitting transport this workspace ships. Single-process
//! deployment and tests talk to `chain_consensus::LocalCoordinator` directly
//! and never touch this crate.

pub mod client;
pub mod dto;
pub mod errors;
pub mod server;

pub use client::{HttpInternalApiClient, HttpValidatorClient};
pub use errors::NetworkError;
