//! The coordinator state machine, proposer round logic, and validator
//! algorithm — the three cooperating roles that turn a pending-transaction
//! queue into a committed, hash-chained block history.
//!
//! This crate owns no networking: `InternalApi` and `ValidatorClient` are
//! the seams where `chain-network`'s HTTP transport (or, for single-process
//! deployment and tests, an in-process adapter defined right here) plugs
//! in. `BackupTrigger` is the matching seam toward `chain-storage`, kept
//! here rather than imported so this crate never depends on storage.

pub mod api;
pub mod backup;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod proposer;
pub mod validator;

pub use api::{CommitSummary, InternalApi, TransactionRecord, TransactionStatus};
pub use backup::{BackupTrigger, NoopBackup};
pub use clock::now_ms;
pub use coordinator::LocalCoordinator;
pub use error::{CoordinatorError, ProposerError, Result, ValidationError};
pub use proposer::{Proposer, ValidatorClient};
pub use validator::{LocalValidatorClient, ValidateRequest, ValidateResponse, Validator};
