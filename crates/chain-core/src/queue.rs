use crate::block::Block;
use crate::transaction::Transaction;
use chain_crypto::Hash256;
use std::collections::VecDeque;

/// The FIFO queue of admitted, not-yet-committed transactions, plus the
/// in-flight round bookkeeping the coordinator guards with its write lock.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    transactions: VecDeque<Transaction>,
    pub processing: bool,
    pub processing_started_at_ms: Option<u64>,
    pub current_block: Option<Block>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn contains_hash(&self, hash: &Hash256) -> bool {
        self.transactions.iter().any(|t| &t.hash == hash)
    }

    pub fn push_back(&mut self, tx: Transaction) {
        self.transactions.push_back(tx);
    }

    /// The first `min(n, len)` transactions, in FIFO order, without removing
    /// them — used by `packBlock` to assemble a candidate.
    pub fn peek_front(&self, n: usize) -> Vec<Transaction> {
        self.transactions.iter().take(n).cloned().collect()
    }

    /// Removes every transaction whose hash is in `hashes`, used after a
    /// successful commit to drop exactly the executed transactions.
    pub fn remove_hashes(&mut self, hashes: &[Hash256]) {
        self.transactions.retain(|t| !hashes.contains(&t.hash));
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }
}
