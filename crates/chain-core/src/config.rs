use chain_crypto::{Address, Amount, PublicKey};
use serde::{Deserialize, Serialize};

/// Consensus-tunable parameters, set once at genesis and otherwise immutable
/// for the lifetime of the chain (no dynamic validator set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    pub block_max_txs: usize,
    pub block_min_txs: usize,
    pub consensus_timeout_ms: u64,
    pub watchdog_timeout_ms: u64,
    pub validators: Vec<PublicKey>,
    pub required_signatures: usize,
    /// The key `commitBlock` checks each block's `proposerSignature` against.
    pub proposer_public_key: PublicKey,
}

impl ConsensusConfig {
    /// `requiredSignatures = ceil(2 * |validators| / 3)`.
    pub fn required_signatures_for(validator_count: usize) -> usize {
        (2 * validator_count).div_ceil(3)
    }

    pub fn new(
        validators: Vec<PublicKey>,
        proposer_public_key: PublicKey,
        consensus_timeout_ms: u64,
        watchdog_timeout_ms: u64,
    ) -> Self {
        let required_signatures = Self::required_signatures_for(validators.len());
        Self {
            block_max_txs: 100,
            block_min_txs: 0,
            consensus_timeout_ms,
            watchdog_timeout_ms,
            validators,
            required_signatures,
            proposer_public_key,
        }
    }
}

/// A premined account credited at genesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremineEntry {
    pub address: Address,
    pub amount: Amount,
    pub description: String,
}

/// A validator seat declared in the genesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub id: String,
    pub public_key: PublicKey,
    pub address: Address,
    pub stake: Amount,
    pub commission_pct: u8,
}

/// Token metadata used only for display in the HTTP façade's `/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Genesis configuration: everything needed to deterministically build block
/// 0 and the initial validator set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub chain_id: u32,
    pub network_id: String,
    pub genesis_timestamp_ms: u64,
    pub token: TokenMetadata,
    pub premine: Vec<PremineEntry>,
    pub validators: Vec<ValidatorEntry>,
    /// The proposer's declared public key; `commitBlock` rejects any block
    /// whose `proposerSignature` doesn't verify against it.
    pub proposer_public_key: PublicKey,
    /// Informational only; block production is event-driven, not timed.
    pub block_time_ms: u64,
    pub genesis_block_reward: Amount,
    pub consensus_timeout_ms: u64,
    pub watchdog_timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_signatures_rounds_up() {
        assert_eq!(ConsensusConfig::required_signatures_for(3), 2);
        assert_eq!(ConsensusConfig::required_signatures_for(4), 3);
        assert_eq!(ConsensusConfig::required_signatures_for(1), 1);
    }
}
