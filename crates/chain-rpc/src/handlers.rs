use crate::dto::*;
use crate::errors::RpcError;
use chain_consensus::{InternalApi, Proposer, TransactionStatus};
use chain_core::{Transaction, UnsignedTransaction};
use chain_crypto::{Address, Amount, KeyPair};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The node's client-facing request logic, independent of the `warp`
/// plumbing in `server.rs` so it can be unit-tested without spinning up an
/// HTTP listener.
pub struct RpcHandler {
    coordinator: Arc<dyn InternalApi>,
    proposer: Arc<Proposer>,
    chain_id: u64,
    network_id: String,
    mainnet: bool,
    validator_count: usize,
    faucet_key: Option<Arc<KeyPair>>,
    next_faucet_sequence: Mutex<Option<u64>>,
}

impl RpcHandler {
    pub fn new(
        coordinator: Arc<dyn InternalApi>,
        proposer: Arc<Proposer>,
        chain_id: u64,
        network_id: String,
        mainnet: bool,
        validator_count: usize,
        faucet_key: Option<Arc<KeyPair>>,
    ) -> Self {
        Self {
            coordinator,
            proposer,
            chain_id,
            network_id,
            mainnet,
            validator_count,
            faucet_key,
            next_faucet_sequence: Mutex::new(None),
        }
    }

    /// Wakes the proposer in the background instead of making the caller
    /// wait for a full round — the "trigger discipline" that replaces
    /// block-time polling. Errors surface through `worldState.lastProposerError`
    /// on the next `/status` read, not back to this request.
    fn wake_proposer(&self) {
        let proposer = self.proposer.clone();
        tokio::spawn(async move {
            let _ = proposer.trigger().await;
        });
    }

    pub fn health(&self) -> &'static str {
        "ok"
    }

    pub async fn status(&self) -> NetworkStatus {
        let state = self.coordinator.query_state().await;
        let pending_tx_count = self.coordinator.query_pending_count().await as u64;
        NetworkStatus {
            chain_id: self.chain_id,
            network_id: self.network_id.clone(),
            latest_height: state.latest_height,
            latest_hash: state.latest_hash,
            pending_tx_count,
            validator_count: self.validator_count,
        }
    }

    pub async fn submit_tx(&self, req: SubmitTxRequest) -> Result<SubmitTxResponse, RpcError> {
        if Address::from_public_key(req.public_key.inner()) != req.from {
            return Err(RpcError::AddressMismatch);
        }
        let preimage = chain_core::Transaction::sign_preimage(&req.from, &req.to, &req.amount, req.sequence, req.timestamp_ms)
            .map_err(|_| RpcError::MalformedRequest)?;
        if !req.public_key.inner().verify_strict(&preimage, req.signature.inner()).is_ok() {
            return Err(RpcError::InvalidSignature);
        }
        let tx = Transaction::from_signed(
            UnsignedTransaction {
                from: req.from,
                to: req.to,
                amount: req.amount,
                sequence: req.sequence,
                timestamp_ms: req.timestamp_ms,
                public_key: req.public_key,
                gas_price: Amount::zero(),
                gas_limit: 21_000,
            },
            req.signature,
        )
        .map_err(|_| RpcError::MalformedRequest)?;

        let tx_hash = tx.hash;
        self.coordinator.add_transaction(tx).await?;
        self.wake_proposer();
        Ok(SubmitTxResponse { tx_hash, estimated_confirmation_ms: 5_000 })
    }

    pub async fn tx_receipt(&self, hash: chain_crypto::Hash256) -> Result<TransactionReceipt, RpcError> {
        let record = self.coordinator.query_transaction(hash).await.ok_or(RpcError::TransactionNotFound)?;
        Ok(TransactionReceipt {
            hash: record.transaction.hash,
            from: record.transaction.from,
            to: record.transaction.to,
            amount: record.transaction.amount,
            sequence: record.transaction.sequence,
            status: match record.status {
                TransactionStatus::Pending => TransactionStatusDto::Pending,
                TransactionStatus::Committed { height } => TransactionStatusDto::Committed { height },
            },
        })
    }

    pub async fn account_info(&self, addr: Address) -> AccountInfo {
        let state = self.coordinator.query_state().await;
        let records = self.coordinator.get_transactions_by_address(addr).await;
        let pending = records
            .iter()
            .filter(|r| r.transaction.from == addr && matches!(r.status, TransactionStatus::Pending))
            .count() as u64;
        AccountInfo {
            address: addr,
            balance: state.balance_of(&addr),
            sequence: state.sequence_of(&addr),
            pending_sequence: state.sequence_of(&addr) + pending,
        }
    }

    pub async fn account_txs(&self, addr: Address) -> Vec<TransactionReceipt> {
        self.coordinator
            .get_transactions_by_address(addr)
            .await
            .into_iter()
            .map(|record| TransactionReceipt {
                hash: record.transaction.hash,
                from: record.transaction.from,
                to: record.transaction.to,
                amount: record.transaction.amount,
                sequence: record.transaction.sequence,
                status: match record.status {
                    TransactionStatus::Pending => TransactionStatusDto::Pending,
                    TransactionStatus::Committed { height } => TransactionStatusDto::Committed { height },
                },
            })
            .collect()
    }

    pub async fn latest_block(&self) -> Result<LatestBlockSummary, RpcError> {
        let block = self.coordinator.query_latest_block().await.ok_or(RpcError::BlockNotFound)?;
        Ok(LatestBlockSummary::from(&block))
    }

    pub async fn block_by_height(&self, height: u64) -> Result<chain_core::Block, RpcError> {
        self.coordinator.query_block(height).await.ok_or(RpcError::BlockNotFound)
    }

    pub async fn faucet(&self, req: FaucetRequest) -> Result<SubmitTxResponse, RpcError> {
        if self.mainnet {
            return Err(RpcError::FaucetDisabled);
        }
        let key = self.faucet_key.as_ref().ok_or(RpcError::FaucetDisabled)?;
        let from = Address::from_public_key(&key.verifying_key());

        let mut cached = self.next_faucet_sequence.lock().await;
        let sequence = match *cached {
            Some(seq) => seq,
            None => self.coordinator.query_state().await.sequence_of(&from),
        };

        let timestamp_ms = chain_consensus::now_ms();
        let preimage = chain_core::Transaction::sign_preimage(&from, &req.to, &req.amount, sequence, timestamp_ms)
            .map_err(|_| RpcError::Internal)?;
        let signature = key.sign(&preimage);
        let tx = Transaction::from_signed(
            UnsignedTransaction {
                from,
                to: req.to,
                amount: req.amount,
                sequence,
                timestamp_ms,
                public_key: key.public_key(),
                gas_price: Amount::zero(),
                gas_limit: 21_000,
            },
            signature,
        )
        .map_err(|_| RpcError::Internal)?;

        let tx_hash = tx.hash;
        self.coordinator.add_transaction(tx).await?;
        *cached = Some(sequence + 1);
        drop(cached);
        self.wake_proposer();
        Ok(SubmitTxResponse { tx_hash, estimated_confirmation_ms: 5_000 })
    }

    pub async fn init_genesis(&self, config: &chain_core::GenesisConfig, force: bool) -> Result<(), RpcError> {
        self.coordinator.init_genesis(config, force).await.map_err(RpcError::from)
    }
}
