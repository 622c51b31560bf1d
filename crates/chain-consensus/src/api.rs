use crate::error::Result;
use async_trait::async_trait;
use chain_core::{Block, ChainSnapshot, GenesisConfig, NodeId, Transaction, WorldState};

/// The operations the coordinator exposes to the proposer and every
/// validator. A thin client over whatever transport separates the
/// processes satisfies this trait in production; `LocalCoordinator` (the
/// coordinator calling into itself) satisfies it directly for single-process
/// deployment and for tests — the recommended strategy from the workspace
/// design notes on keeping the ownership graph acyclic.
#[async_trait]
pub trait InternalApi: Send + Sync {
    async fn init_genesis(&self, genesis: &GenesisConfig, force: bool) -> Result<()>;
    async fn restore_snapshot(&self, snapshot: ChainSnapshot, cid: String, force: bool) -> Result<()>;

    async fn add_transaction(&self, tx: Transaction) -> Result<()>;
    async fn acquire_processing_lock(&self) -> Result<Vec<Transaction>>;
    async fn release_processing_lock(&self, clear_queue: bool) -> Result<()>;
    async fn pack_block(&self, proposer_id: NodeId) -> Result<Block>;
    async fn commit_block(&self, block: Block) -> Result<CommitSummary>;

    async fn query_state(&self) -> WorldState;
    async fn query_pending_count(&self) -> usize;
    async fn query_block(&self, height: u64) -> Option<Block>;
    async fn query_blocks_range(&self, start: u64, limit: usize) -> Vec<Block>;
    async fn query_latest_block(&self) -> Option<Block>;
    async fn query_transaction(&self, hash: chain_crypto::Hash256) -> Option<TransactionRecord>;
    async fn get_transactions_by_address(&self, addr: chain_crypto::Address) -> Vec<TransactionRecord>;

    async fn report_error(&self, message: String);
}

/// Result of a successful `commitBlock`, returned up through the proposer to
/// whatever triggered the round.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitSummary {
    pub height: u64,
    pub hash: chain_crypto::Hash256,
    pub tx_count: u64,
    pub elapsed_ms: u64,
}

/// A transaction plus whether it is still pending or has been committed
/// (and at what height), for `/tx/{hash}` and `/account/{addr}/txs`.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub transaction: Transaction,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Committed { height: u64 },
}
