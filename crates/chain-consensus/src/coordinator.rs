use crate::backup::BackupTrigger;
use crate::clock::now_ms;
use crate::error::{CoordinatorError, Result};
use chain_core::{
    Block, BlockHeader, BlockHistory, ChainSnapshot, ConsensusConfig, GenesisConfig, NodeId,
    PendingQueue, Transaction, WorldState,
};
use chain_crypto::{Address, Hash256, KeyPair};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::{CommitSummary, InternalApi, TransactionRecord, TransactionStatus};

/// The single mutable record the coordinator owns: world state, the pending
/// queue, block history, and consensus config. Every write takes this one
/// lock and mutates the whole record — no per-field locking, because the
/// invariants it enforces span every field at once.
struct ChainState {
    world_state: WorldState,
    queue: PendingQueue,
    history: BlockHistory,
    config: ConsensusConfig,
    committed_hashes: HashSet<Hash256>,
    initialized: bool,
    last_backup_at_ms: u64,
}

impl ChainState {
    /// Placeholder state before `init_genesis` runs; its `config` (including
    /// `proposer_public_key`) is discarded wholesale once a real genesis
    /// loads, so an arbitrary key here is fine.
    fn empty() -> Self {
        Self {
            world_state: WorldState::new(),
            queue: PendingQueue::new(),
            history: BlockHistory::new(),
            config: ConsensusConfig::new(vec![], KeyPair::generate().public_key(), 5_000, 10_000),
            committed_hashes: HashSet::new(),
            initialized: false,
            last_backup_at_ms: 0,
        }
    }
}

/// The singleton authoritative state machine. Owns world state, the pending
/// queue, block history, the round lock, and the watchdog timer.
pub struct LocalCoordinator {
    state: Mutex<ChainState>,
    watchdog: Mutex<Option<JoinHandle<()>>>,
    backup: Arc<dyn BackupTrigger>,
    backup_interval_ms: u64,
    /// Lets the watchdog re-arm itself from a plain `&self` method by
    /// reconstructing an owned `Arc` for the spawned task.
    self_weak: Weak<LocalCoordinator>,
}

impl LocalCoordinator {
    pub fn new(backup: Arc<dyn BackupTrigger>, backup_interval_ms: u64) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(ChainState::empty()),
            watchdog: Mutex::new(None),
            backup,
            backup_interval_ms,
            self_weak: weak.clone(),
        })
    }

    fn arc_self(&self) -> Arc<LocalCoordinator> {
        self.self_weak.upgrade().expect("coordinator outlives its own tasks")
    }

    // ---- genesis -----------------------------------------------------

    pub async fn init_genesis(&self, genesis: &GenesisConfig, force: bool) -> Result<()> {
        let mut guard = self.state.lock().await;
        if guard.initialized && !force {
            return Err(CoordinatorError::AlreadyInitialised);
        }
        let (genesis_block, world_state, config) = chain_core::genesis::build_genesis(genesis);
        let mut history = BlockHistory::new();
        let mut committed_hashes = HashSet::new();
        for tx in &genesis_block.transactions {
            committed_hashes.insert(tx.hash);
        }
        history.append(genesis_block);
        *guard = ChainState {
            world_state,
            queue: PendingQueue::new(),
            history,
            config,
            committed_hashes,
            initialized: true,
            last_backup_at_ms: now_ms(),
        };
        Ok(())
    }

    /// Installs a snapshot the caller already fetched and decrypted, after
    /// checking `cid` against the backup index's most recent entry
    /// (anti-rollback) and that the chain is uninitialised unless `force` is
    /// set. Pending queue and full history are not part of a snapshot (see
    /// `ChainSnapshot`'s doc comment) so both start empty after a restore.
    pub async fn restore_snapshot(&self, snapshot: ChainSnapshot, cid: &str, force: bool) -> Result<()> {
        let mut guard = self.state.lock().await;
        if guard.initialized && guard.world_state.latest_height != 0 && !force {
            return Err(CoordinatorError::AlreadyInitialised);
        }
        if self.backup.latest_backup_cid().await.as_deref() != Some(cid) {
            return Err(CoordinatorError::CidMismatch);
        }
        // A snapshot carries world state only, not block bodies, so history
        // starts empty; `query_block`/`query_blocks_range` simply have no
        // hits below the restored height until new blocks are committed.
        *guard = ChainState {
            world_state: snapshot.world_state,
            queue: PendingQueue::new(),
            history: BlockHistory::new(),
            config: snapshot.config,
            committed_hashes: HashSet::new(),
            initialized: true,
            last_backup_at_ms: now_ms(),
        };
        Ok(())
    }

    // ---- writes --------------------------------------------------------

    pub async fn add_transaction(&self, tx: Transaction) -> Result<()> {
        tx.verify_well_formed()?;

        let mut guard = self.state.lock().await;
        if guard.queue.contains_hash(&tx.hash) || guard.committed_hashes.contains(&tx.hash) {
            return Err(CoordinatorError::DuplicateTransaction);
        }
        let expected = guard.world_state.sequence_of(&tx.from);
        if tx.sequence != expected {
            return Err(CoordinatorError::SequenceMismatch { expected });
        }
        let balance = guard.world_state.balance_of(&tx.from);
        if balance < tx.amount {
            return Err(CoordinatorError::InsufficientBalance);
        }
        guard.queue.push_back(tx);
        guard.world_state.last_updated_ms = now_ms();
        Ok(())
    }

    pub async fn acquire_processing_lock(&self) -> Result<Vec<Transaction>> {
        let mut guard = self.state.lock().await;
        let now = now_ms();
        if guard.queue.processing {
            let started = guard.queue.processing_started_at_ms.unwrap_or(0);
            if now.saturating_sub(started) < guard.config.consensus_timeout_ms {
                return Err(CoordinatorError::RoundInProgress);
            }
            // Stale lock: the watchdog either hasn't fired yet or this caller
            // raced it. Either way, a lock older than the timeout is
            // implicitly takeable.
        }
        if guard.queue.is_empty() {
            return Err(CoordinatorError::Empty);
        }
        guard.queue.processing = true;
        guard.queue.processing_started_at_ms = Some(now);
        let n = guard.queue.len();
        Ok(guard.queue.peek_front(n))
    }

    pub async fn release_processing_lock(&self, clear_queue: bool) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            guard.queue.processing = false;
            guard.queue.processing_started_at_ms = None;
            guard.queue.current_block = None;
            if clear_queue {
                guard.queue.clear();
            }
        }
        self.cancel_watchdog().await;
        Ok(())
    }

    pub async fn pack_block(&self, proposer_id: NodeId) -> Result<Block> {
        let block = {
            let mut guard = self.state.lock().await;
            if guard.queue.is_empty() {
                return Err(CoordinatorError::Empty);
            }
            let n = guard.config.block_max_txs.min(guard.queue.len());
            let txs = guard.queue.peek_front(n);

            let (sim_state, _executed) = chain_core::state::simulate(guard.world_state.clone(), &txs);
            let tx_hashes: Vec<Hash256> = txs.iter().map(|t| t.hash).collect();
            let header = BlockHeader {
                height: guard.world_state.latest_height + 1,
                timestamp_ms: now_ms(),
                prev_hash: guard.world_state.latest_hash,
                tx_root: chain_crypto::merkle_root(&tx_hashes),
                state_root: sim_state.state_root()?,
                proposer: proposer_id,
                tx_count: txs.len() as u64,
            };
            let block = Block::new(header, txs)?;
            guard.queue.processing = true;
            guard.queue.processing_started_at_ms = Some(now_ms());
            guard.queue.current_block = Some(block.clone());
            block
        };
        self.arm_watchdog().await;
        Ok(block)
    }

    pub async fn commit_block(&self, block: Block) -> Result<CommitSummary> {
        let start = now_ms();
        let (summary, snapshot) = {
            let mut guard = self.state.lock().await;

            if block.header.height != guard.world_state.latest_height + 1 {
                return Err(CoordinatorError::WrongHeight);
            }
            if block.header.prev_hash != guard.world_state.latest_hash {
                return Err(CoordinatorError::WrongParent);
            }
            if !block.verify_proposer_signature(&guard.config.proposer_public_key) {
                return Err(CoordinatorError::InvalidProposerSignature);
            }

            // Quorum counts only votes from declared validators with a
            // signature that actually verifies; distinct_voter_addresses()
            // does the addr-level dedup once that filtering is done.
            let mut counted_block = block.clone();
            counted_block.votes = block
                .votes
                .iter()
                .filter(|vote| guard.config.validators.contains(&vote.validator_pub_key))
                .filter(|vote| block.verify_vote_signature(vote))
                .cloned()
                .collect();
            if counted_block.distinct_voter_addresses().len() < guard.config.required_signatures {
                return Err(CoordinatorError::InsufficientSignatures);
            }

            let (new_state, executed) =
                chain_core::state::simulate(guard.world_state.clone(), &block.transactions);
            let mut new_state = new_state;
            new_state.latest_height = block.header.height;
            new_state.latest_hash = block.hash;
            new_state.genesis_hash = guard.world_state.genesis_hash;
            new_state.total_tx = guard.world_state.total_tx + executed.len() as u64;
            new_state.last_updated_ms = now_ms();
            new_state.last_proposer_error = guard.world_state.last_proposer_error.clone();
            guard.world_state = new_state;

            for tx in &executed {
                guard.committed_hashes.insert(tx.hash);
            }
            let executed_hashes: Vec<Hash256> = executed.iter().map(|t| t.hash).collect();
            guard.queue.remove_hashes(&executed_hashes);
            guard.queue.processing = false;
            guard.queue.processing_started_at_ms = None;
            guard.queue.current_block = None;

            guard.history.append(block.clone());

            let now = now_ms();
            let should_backup = now.saturating_sub(guard.last_backup_at_ms) > self.backup_interval_ms;
            let snapshot = if should_backup {
                guard.last_backup_at_ms = now;
                Some(ChainSnapshot {
                    world_state: guard.world_state.clone(),
                    config: guard.config.clone(),
                    latest_height: guard.world_state.latest_height,
                })
            } else {
                None
            };

            let summary = CommitSummary {
                height: guard.world_state.latest_height,
                hash: guard.world_state.latest_hash,
                tx_count: executed.len() as u64,
                elapsed_ms: now.saturating_sub(start),
            };
            (summary, snapshot)
        };

        self.cancel_watchdog().await;
        if let Some(snapshot) = snapshot {
            self.spawn_backup(snapshot);
        }
        Ok(summary)
    }

    pub async fn report_error(&self, message: String) {
        let mut guard = self.state.lock().await;
        guard.world_state.last_proposer_error = Some(message);
    }

    // ---- reads -----------------------------------------------------------

    pub async fn query_state(&self) -> WorldState {
        self.state.lock().await.world_state.clone()
    }

    pub async fn query_pending_count(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn query_block(&self, height: u64) -> Option<Block> {
        self.state.lock().await.history.get(height).cloned()
    }

    pub async fn query_blocks_range(&self, start: u64, limit: usize) -> Vec<Block> {
        self.state
            .lock()
            .await
            .history
            .range(start, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn query_latest_block(&self) -> Option<Block> {
        self.state.lock().await.history.latest().cloned()
    }

    pub async fn query_transaction(&self, hash: Hash256) -> Option<TransactionRecord> {
        let guard = self.state.lock().await;
        if let Some(tx) = guard.queue.iter().find(|t| t.hash == hash) {
            return Some(TransactionRecord {
                transaction: tx.clone(),
                status: TransactionStatus::Pending,
            });
        }
        for height in 0..=guard.world_state.latest_height {
            if let Some(block) = guard.history.get(height) {
                if let Some(tx) = block.transactions.iter().find(|t| t.hash == hash) {
                    return Some(TransactionRecord {
                        transaction: tx.clone(),
                        status: TransactionStatus::Committed { height },
                    });
                }
            }
        }
        None
    }

    pub async fn get_transactions_by_address(&self, addr: Address) -> Vec<TransactionRecord> {
        let guard = self.state.lock().await;
        let mut out = Vec::new();
        for height in 0..=guard.world_state.latest_height {
            if let Some(block) = guard.history.get(height) {
                for tx in &block.transactions {
                    if tx.from == addr || tx.to == addr {
                        out.push(TransactionRecord {
                            transaction: tx.clone(),
                            status: TransactionStatus::Committed { height },
                        });
                    }
                }
            }
        }
        for tx in guard.queue.iter() {
            if tx.from == addr || tx.to == addr {
                out.push(TransactionRecord {
                    transaction: tx.clone(),
                    status: TransactionStatus::Pending,
                });
            }
        }
        out
    }

    // ---- watchdog ----------------------------------------------------

    async fn cancel_watchdog(&self) {
        if let Some(handle) = self.watchdog.lock().await.take() {
            handle.abort();
        }
    }

    async fn arm_watchdog(&self) {
        self.cancel_watchdog().await;
        let timeout_ms = self.state.lock().await.config.watchdog_timeout_ms;
        self.schedule_watchdog(timeout_ms).await;
    }

    fn schedule_watchdog(
        &self,
        delay_ms: u64,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let coordinator = self.arc_self();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                coordinator.on_watchdog_fire().await;
            });
            *self.watchdog.lock().await = Some(handle);
        })
    }

    /// Fires when a round has been stuck for longer than `watchdogTimeoutMs`.
    /// Releases the lock without clearing the queue (so the next trigger can
    /// retry), opportunistically schedules a backup, and re-arms itself at a
    /// larger horizon so an idle chain still gets periodic backups.
    fn on_watchdog_fire(&self) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let snapshot = {
                let mut guard = self.state.lock().await;
                if guard.queue.processing {
                    tracing::warn!(
                        height = guard.world_state.latest_height,
                        "watchdog released a stuck consensus round"
                    );
                    guard.queue.processing = false;
                    guard.queue.processing_started_at_ms = None;
                    guard.queue.current_block = None;
                }
                let now = now_ms();
                if now.saturating_sub(guard.last_backup_at_ms) > self.backup_interval_ms {
                    guard.last_backup_at_ms = now;
                    Some(ChainSnapshot {
                        world_state: guard.world_state.clone(),
                        config: guard.config.clone(),
                        latest_height: guard.world_state.latest_height,
                    })
                } else {
                    None
                }
            };
            if let Some(snapshot) = snapshot {
                self.spawn_backup(snapshot);
            }
            let horizon_ms = (self.backup_interval_ms as f64 * 1.5) as u64;
            self.schedule_watchdog(horizon_ms).await;
        })
    }

    fn spawn_backup(&self, snapshot: ChainSnapshot) {
        let backup = Arc::clone(&self.backup);
        tokio::spawn(async move {
            backup.trigger_backup(snapshot).await;
        });
    }
}

#[async_trait::async_trait]
impl InternalApi for LocalCoordinator {
    async fn init_genesis(&self, genesis: &GenesisConfig, force: bool) -> Result<()> {
        LocalCoordinator::init_genesis(self, genesis, force).await
    }

    async fn restore_snapshot(&self, snapshot: ChainSnapshot, cid: String, force: bool) -> Result<()> {
        LocalCoordinator::restore_snapshot(self, snapshot, &cid, force).await
    }

    async fn add_transaction(&self, tx: Transaction) -> Result<()> {
        LocalCoordinator::add_transaction(self, tx).await
    }

    async fn acquire_processing_lock(&self) -> Result<Vec<Transaction>> {
        LocalCoordinator::acquire_processing_lock(self).await
    }

    async fn release_processing_lock(&self, clear_queue: bool) -> Result<()> {
        LocalCoordinator::release_processing_lock(self, clear_queue).await
    }

    async fn pack_block(&self, proposer_id: NodeId) -> Result<Block> {
        LocalCoordinator::pack_block(self, proposer_id).await
    }

    async fn commit_block(&self, block: Block) -> Result<CommitSummary> {
        LocalCoordinator::commit_block(self, block).await
    }

    async fn query_state(&self) -> WorldState {
        LocalCoordinator::query_state(self).await
    }

    async fn query_pending_count(&self) -> usize {
        LocalCoordinator::query_pending_count(self).await
    }

    async fn query_block(&self, height: u64) -> Option<Block> {
        LocalCoordinator::query_block(self, height).await
    }

    async fn query_blocks_range(&self, start: u64, limit: usize) -> Vec<Block> {
        LocalCoordinator::query_blocks_range(self, start, limit).await
    }

    async fn query_latest_block(&self) -> Option<Block> {
        LocalCoordinator::query_latest_block(self).await
    }

    async fn query_transaction(&self, hash: Hash256) -> Option<TransactionRecord> {
        LocalCoordinator::query_transaction(self, hash).await
    }

    async fn get_transactions_by_address(&self, addr: Address) -> Vec<TransactionRecord> {
        LocalCoordinator::get_transactions_by_address(self, addr).await
    }

    async fn report_error(&self, message: String) {
        LocalCoordinator::report_error(self, message).await
    }
}
