//! Domain types for the ledger: transactions, blocks, world state, the
//! pending queue, block history, and consensus/genesis configuration.
//!
//! This crate has no concurrency or networking concerns of its own — those
//! live in `chain-consensus` and `chain-network`. Everything here is plain,
//! synchronous, and deterministic so it can be shared byte-for-byte between
//! the coordinator, the proposer, and every validator.

pub mod block;
pub mod config;
pub mod error;
pub mod genesis;
pub mod history;
pub mod queue;
pub mod snapshot;
pub mod state;
pub mod transaction;

pub use block::{Block, BlockHeader, NodeId, Vote};
pub use config::{ConsensusConfig, GenesisConfig, PremineEntry, TokenMetadata, ValidatorEntry};
pub use error::{CoreError, Result};
pub use history::BlockHistory;
pub use queue::PendingQueue;
pub use snapshot::ChainSnapshot;
pub use state::WorldState;
pub use transaction::{Transaction, UnsignedTransaction};
