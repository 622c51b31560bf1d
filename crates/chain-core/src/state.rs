use chain_crypto::{canonical::hash_canonical, Address, Amount, Hash256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::transaction::Transaction;

/// The committed balances and sequences for every known account, plus the
/// chain-head pointers. The sole owner of this is the coordinator; every
/// mutation goes through `try_apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub balances: HashMap<Address, Amount>,
    pub sequences: HashMap<Address, u64>,
    pub latest_height: u64,
    pub latest_hash: Hash256,
    pub genesis_hash: Hash256,
    pub total_tx: u64,
    pub last_updated_ms: u64,
    pub last_proposer_error: Option<String>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            sequences: HashMap::new(),
            latest_height: 0,
            latest_hash: Hash256::zero(),
            genesis_hash: Hash256::zero(),
            total_tx: 0,
            last_updated_ms: 0,
            last_proposer_error: None,
        }
    }

    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).cloned().unwrap_or_else(Amount::zero)
    }

    pub fn sequence_of(&self, addr: &Address) -> u64 {
        *self.sequences.get(addr).unwrap_or(&0)
    }

    pub fn credit(&mut self, addr: Address, amount: &Amount) {
        let entry = self.balances.entry(addr).or_insert_with(Amount::zero);
        *entry = &*entry + amount;
    }

    /// Applies `tx` to this state if and only if its sequence matches the
    /// running per-sender counter and the sender can afford it. Returns
    /// `true` if applied. The caller (pack/validate/commit) is responsible
    /// for silently skipping `false` rather than aborting — a single bad
    /// transaction never halts block execution.
    pub fn try_apply(&mut self, tx: &Transaction) -> bool {
        let expected_seq = self.sequence_of(&tx.from);
        if tx.sequence != expected_seq {
            return false;
        }
        let balance = self.balance_of(&tx.from);
        let Some(remaining) = balance.checked_sub(&tx.amount) else {
            return false;
        };
        self.balances.insert(tx.from, remaining);
        self.credit(tx.to, &tx.amount);
        self.sequences.insert(tx.from, expected_seq + 1);
        true
    }

    /// Computes `stateRoot`: SHA-256 over canonical JSON of
    /// `{balances: [[addr, decimal], ...], sequences: {addr: n}}`, with the
    /// balances array sorted by address so the root is deterministic
    /// irrespective of `HashMap` iteration order.
    pub fn state_root(&self) -> Result<Hash256> {
        let mut balances: Vec<(String, String)> = self
            .balances
            .iter()
            .map(|(addr, amount)| (addr.to_hex(), amount.to_string()))
            .collect();
        balances.sort_by(|a, b| a.0.cmp(&b.0));

        let sequences: BTreeMap<String, u64> = self
            .sequences
            .iter()
            .map(|(addr, seq)| (addr.to_hex(), *seq))
            .collect();

        Ok(hash_canonical(&StateRootPreimage { balances, sequences })?)
    }
}

#[derive(Serialize)]
struct StateRootPreimage {
    balances: Vec<(String, String)>,
    sequences: BTreeMap<String, u64>,
}

/// Simulates executing `txs` over a snapshot of `state`, skipping any
/// transaction that would violate the sequence/balance rule, and returns
/// the transactions that were actually applied together with the resulting
/// state. Shared verbatim by `packBlock`'s simulation, `commitBlock`'s
/// execution, and the validator's re-simulation — any divergence between
/// call sites would fork consensus.
pub fn simulate(mut state: WorldState, txs: &[Transaction]) -> (WorldState, Vec<Transaction>) {
    let mut executed = Vec::with_capacity(txs.len());
    for tx in txs {
        if state.try_apply(tx) {
            executed.push(tx.clone());
        }
    }
    (state, executed)
}
