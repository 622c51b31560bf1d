use crate::api::{CommitSummary, InternalApi};
use crate::error::{CoordinatorError, ProposerError};
use crate::validator::{ValidateRequest, ValidateResponse};
use chain_core::{NodeId, Vote};
use chain_crypto::KeyPair;
use std::sync::Arc;
use std::time::Duration;

/// The proposer's outbound view of a validator: send a candidate block, get
/// back a vote or a reason it was refused. An in-process adapter
/// (`crate::validator::LocalValidatorClient`) satisfies this for
/// single-process deployment and tests; `chain-network` provides an HTTP
/// implementation for split-process deployment.
#[async_trait::async_trait]
pub trait ValidatorClient: Send + Sync {
    async fn validate(&self, request: ValidateRequest) -> std::result::Result<ValidateResponse, String>;
}

/// Stateless between rounds: holds only the proposer's signing key, its
/// node id, the validator set it fans out to, and the timing/quorum
/// parameters mirrored from the chain's consensus config.
pub struct Proposer {
    id: NodeId,
    keypair: KeyPair,
    coordinator: Arc<dyn InternalApi>,
    validators: Vec<Arc<dyn ValidatorClient>>,
    consensus_timeout_ms: u64,
    required_signatures: usize,
}

impl Proposer {
    pub fn new(
        id: NodeId,
        keypair: KeyPair,
        coordinator: Arc<dyn InternalApi>,
        validators: Vec<Arc<dyn ValidatorClient>>,
        consensus_timeout_ms: u64,
        required_signatures: usize,
    ) -> Self {
        Self {
            id,
            keypair,
            coordinator,
            validators,
            consensus_timeout_ms,
            required_signatures,
        }
    }

    /// Runs exactly one round if the queue is non-empty and no round is
    /// already in progress. Returns `Ok(None)` for the idempotent no-op
    /// cases (`RoundInProgress`/`Empty`) rather than treating them as errors.
    pub async fn trigger(&self) -> std::result::Result<Option<CommitSummary>, ProposerError> {
        let result = self.trigger_inner().await;
        if let Err(ref e) = result {
            self.coordinator.report_error(e.to_string()).await;
        }
        result
    }

    async fn trigger_inner(&self) -> std::result::Result<Option<CommitSummary>, ProposerError> {
        match self.coordinator.acquire_processing_lock().await {
            Ok(_txs) => {}
            Err(CoordinatorError::RoundInProgress) | Err(CoordinatorError::Empty) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let mut block = match self.coordinator.pack_block(self.id.clone()).await {
            Ok(b) => b,
            Err(e) => {
                let _ = self.coordinator.release_processing_lock(false).await;
                return Err(e.into());
            }
        };
        block.proposer_signature = Some(block.sign(&self.keypair));

        let deadline = Duration::from_millis(self.consensus_timeout_ms);
        let responses = futures::future::join_all(self.validators.iter().map(|validator| {
            let request = ValidateRequest {
                block: block.clone(),
                proposer_id: self.id.clone(),
            };
            let validator = Arc::clone(validator);
            async move {
                match tokio::time::timeout(deadline, validator.validate(request)).await {
                    Ok(Ok(response)) => Some(response),
                    Ok(Err(_)) | Err(_) => None,
                }
            }
        }))
        .await;

        let mut votes = Vec::new();
        let mut detail = Vec::new();
        for response in responses.into_iter().flatten() {
            if response.valid {
                if let (Some(public_key), Some(signature)) = (response.public_key, response.signature) {
                    votes.push(Vote {
                        validator_id: response.validator_id,
                        validator_pub_key: public_key,
                        signature,
                        timestamp_ms: response.timestamp_ms,
                    });
                    continue;
                }
            }
            if let Some(error) = response.error {
                detail.push(format!("{}: {}", response.validator_id, error));
            }
        }

        if votes.len() < self.required_signatures {
            let _ = self.coordinator.release_processing_lock(false).await;
            return Err(ProposerError::InsufficientSignatures {
                required: self.required_signatures,
                received: votes.len(),
                detail,
            });
        }

        block.votes = votes;
        match self.coordinator.commit_block(block).await {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                let _ = self.coordinator.release_processing_lock(false).await;
                Err(e.into())
            }
        }
    }
}
