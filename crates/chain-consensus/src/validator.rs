use crate::api::InternalApi;
use crate::clock::now_ms;
use crate::error::ValidationError;
use chain_core::{Block, NodeId};
use chain_crypto::{KeyPair, PublicKey, SignatureBytes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Clock skew tolerance for both block and transaction timestamps.
const CLOCK_SKEW_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub block: Block,
    #[serde(rename = "proposerId")]
    pub proposer_id: NodeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(rename = "validatorId")]
    pub validator_id: NodeId,
    #[serde(rename = "publicKey")]
    pub public_key: Option<PublicKey>,
    pub signature: Option<SignatureBytes>,
    pub timestamp_ms: u64,
    pub error: Option<String>,
}

/// Stateless verifier holding only its own key pair and a handle to the
/// coordinator's read surface. Runs once per `/validate` call; never retains
/// state between rounds.
pub struct Validator {
    id: NodeId,
    keypair: KeyPair,
    coordinator: Arc<dyn InternalApi>,
}

impl Validator {
    pub fn new(id: NodeId, keypair: KeyPair, coordinator: Arc<dyn InternalApi>) -> Self {
        Self { id, keypair, coordinator }
    }

    pub async fn validate(&self, block: &Block) -> ValidateResponse {
        match self.check(block).await {
            Ok(()) => {
                let signature = block.sign(&self.keypair);
                ValidateResponse {
                    valid: true,
                    validator_id: self.id.clone(),
                    public_key: Some(self.keypair.public_key()),
                    signature: Some(signature),
                    timestamp_ms: now_ms(),
                    error: None,
                }
            }
            Err(e) => ValidateResponse {
                valid: false,
                validator_id: self.id.clone(),
                public_key: None,
                signature: None,
                timestamp_ms: now_ms(),
                error: Some(e.to_string()),
            },
        }
    }

    async fn check(&self, block: &Block) -> std::result::Result<(), ValidationError> {
        block.verify_hash().map_err(|_| ValidationError::BadHash)?;
        block.verify_tx_count().map_err(|_| ValidationError::TxCountMismatch)?;
        block.verify_tx_root().map_err(|_| ValidationError::BadTxRoot)?;

        let now = now_ms();
        if block.header.timestamp_ms > now + CLOCK_SKEW_MS {
            return Err(ValidationError::TimestampTooFarInFuture);
        }
        for tx in &block.transactions {
            tx.verify_hash().map_err(|_| ValidationError::MalformedTransaction)?;
            if tx.timestamp_ms > now + CLOCK_SKEW_MS {
                return Err(ValidationError::TransactionTimestampTooFarInFuture);
            }
            tx.verify_signature().map_err(|_| ValidationError::MalformedTransaction)?;
        }

        let world = self.coordinator.query_state().await;
        if block.header.height != world.latest_height + 1 {
            return Err(ValidationError::WrongHeight);
        }
        if block.header.prev_hash != world.latest_hash {
            return Err(ValidationError::WrongParent);
        }

        let (sim_state, _executed) = chain_core::state::simulate(world, &block.transactions);
        let computed_root = sim_state.state_root().map_err(|_| ValidationError::BadStateRoot)?;
        if computed_root != block.header.state_root {
            return Err(ValidationError::BadStateRoot);
        }
        Ok(())
    }
}

/// Adapts an in-process [`Validator`] to the proposer's outbound
/// [`crate::proposer::ValidatorClient`] trait, for single-node deployment
/// and for tests that want real validation logic without real networking.
pub struct LocalValidatorClient(pub Arc<Validator>);

#[async_trait::async_trait]
impl crate::proposer::ValidatorClient for LocalValidatorClient {
    async fn validate(&self, request: ValidateRequest) -> std::result::Result<ValidateResponse, String> {
        Ok(self.0.validate(&request.block).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::LocalCoordinator;
    use crate::backup::NoopBackup;
    use chain_core::{GenesisConfig, PremineEntry, TokenMetadata, ValidatorEntry};
    use chain_crypto::{Address, Amount};

    fn sample_genesis(validators: &[KeyPair]) -> GenesisConfig {
        GenesisConfig {
            chain_id: 1,
            network_id: "devnet".into(),
            genesis_timestamp_ms: 1_700_000_000_000,
            token: TokenMetadata { name: "Coin".into(), symbol: "COIN".into(), decimals: 18 },
            premine: vec![PremineEntry {
                address: Address::from_bytes([1u8; 20]),
                amount: Amount::from_u64(1_000_000),
                description: "faucet".into(),
            }],
            proposer_public_key: KeyPair::generate().public_key(),
            validators: validators
                .iter()
                .enumerate()
                .map(|(i, kp)| ValidatorEntry {
                    id: format!("v{i}"),
                    public_key: kp.public_key(),
                    address: Address::from_public_key(&kp.verifying_key()),
                    stake: Amount::from_u64(1),
                    commission_pct: 0,
                })
                .collect(),
            block_time_ms: 2000,
            genesis_block_reward: Amount::zero(),
            consensus_timeout_ms: 5_000,
            watchdog_timeout_ms: 10_000,
        }
    }

    #[tokio::test]
    async fn rejects_block_at_wrong_height() {
        let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
        coordinator
            .init_genesis(&sample_genesis(&validators), false)
            .await
            .unwrap();

        let v = Validator::new("v0".into(), KeyPair::generate(), coordinator.clone());
        let mut block = chain_core::Block::new(
            chain_core::BlockHeader {
                height: 5,
                timestamp_ms: now_ms(),
                prev_hash: chain_crypto::Hash256::zero(),
                tx_root: chain_crypto::Hash256::digest(b""),
                state_root: chain_crypto::Hash256::digest(b""),
                proposer: "p".into(),
                tx_count: 0,
            },
            vec![],
        )
        .unwrap();
        block.proposer_signature = None;

        let resp = v.validate(&block).await;
        assert!(!resp.valid);
        assert_eq!(resp.error.as_deref(), Some("block height does not equal latestHeight + 1"));
    }
}
