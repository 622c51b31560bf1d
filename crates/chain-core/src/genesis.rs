use crate::block::{Block, BlockHeader};
use crate::config::{ConsensusConfig, GenesisConfig};
use crate::state::WorldState;
use crate::transaction::Transaction;
use chain_crypto::{Address, Amount, KeyPair, SignatureBytes};

/// Fixed seed for the nominal signer attached to genesis premine
/// pseudo-transactions. These transactions are manufactured directly by
/// `build_genesis`, never pass through `addTransaction`, and are therefore
/// never subjected to `Transaction::verify_well_formed` (their `from` is the
/// zero address, which by construction cannot match any real key's derived
/// address) — the seed only needs to make `hash`/signature fields well
/// formed, not independently verifiable.
const GENESIS_SIGNER_SEED: [u8; 32] = [0u8; 32];

/// Builds the deterministic genesis block (height 0) from `config`, plus the
/// world state and consensus config that follow from it.
pub fn build_genesis(config: &GenesisConfig) -> (Block, WorldState, ConsensusConfig) {
    let signer = KeyPair::from_seed(GENESIS_SIGNER_SEED);
    let zero_sig = SignatureBytes::from_hex(&format!("0x{}", "00".repeat(64))).unwrap();

    let mut state = WorldState::new();
    let mut txs = Vec::with_capacity(config.premine.len());
    for (i, entry) in config.premine.iter().enumerate() {
        let tx = Transaction {
            hash: chain_crypto::Hash256::zero(),
            from: Address::zero(),
            to: entry.address,
            amount: entry.amount.clone(),
            sequence: i as u64,
            timestamp_ms: config.genesis_timestamp_ms,
            public_key: signer.public_key(),
            signature: zero_sig,
            gas_price: Amount::zero(),
            gas_limit: 21_000,
        };
        let hash = tx.rehash_for_genesis();
        let tx = Transaction { hash, ..tx };
        state.credit(entry.address, &entry.amount);
        txs.push(tx);
    }

    let tx_root = {
        let hashes: Vec<_> = txs.iter().map(|t| t.hash).collect();
        chain_crypto::merkle_root(&hashes)
    };
    let tx_count = txs.len() as u64;

    let header = BlockHeader {
        height: 0,
        timestamp_ms: config.genesis_timestamp_ms,
        prev_hash: chain_crypto::Hash256::zero(),
        tx_root,
        state_root: state.state_root().expect("genesis state root"),
        proposer: "genesis".to_string(),
        tx_count,
    };
    let mut block = Block::new(header, txs).expect("genesis header hashes");
    block.proposer_signature = Some(signer.sign(&crate::block::block_sign_preimage(&block.hash)));

    state.latest_height = 0;
    state.latest_hash = block.hash;
    state.genesis_hash = block.hash;
    state.total_tx = tx_count;
    state.last_updated_ms = config.genesis_timestamp_ms;

    let validator_keys = config.validators.iter().map(|v| v.public_key).collect();
    let consensus_config = ConsensusConfig::new(
        validator_keys,
        config.proposer_public_key,
        config.consensus_timeout_ms,
        config.watchdog_timeout_ms,
    );

    (block, state, consensus_config)
}

impl Transaction {
    /// Recomputes `hash` for a genesis pseudo-transaction (whose fields are
    /// otherwise already final). Pulled out so `build_genesis` can hash
    /// after constructing every other field.
    fn rehash_for_genesis(&self) -> chain_crypto::Hash256 {
        chain_crypto::canonical::hash_canonical(&GenesisHashPreimage::from(self))
            .expect("genesis tx canonical hash")
    }
}

#[derive(serde::Serialize)]
struct GenesisHashPreimage {
    from: Address,
    to: Address,
    amount: Amount,
    sequence: u64,
    timestamp_ms: u64,
    #[serde(rename = "publicKey")]
    public_key: chain_crypto::PublicKey,
    signature: SignatureBytes,
    #[serde(rename = "gasPrice")]
    gas_price: Amount,
    #[serde(rename = "gasLimit")]
    gas_limit: u64,
}

impl From<&Transaction> for GenesisHashPreimage {
    fn from(tx: &Transaction) -> Self {
        Self {
            from: tx.from,
            to: tx.to,
            amount: tx.amount.clone(),
            sequence: tx.sequence,
            timestamp_ms: tx.timestamp_ms,
            public_key: tx.public_key,
            signature: tx.signature,
            gas_price: tx.gas_price.clone(),
            gas_limit: tx.gas_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PremineEntry, TokenMetadata, ValidatorEntry};
    use chain_crypto::KeyPair;

    fn sample_config() -> GenesisConfig {
        let v1 = KeyPair::generate();
        let v2 = KeyPair::generate();
        let v3 = KeyPair::generate();
        let proposer = KeyPair::generate();
        let addr_a = Address::from_bytes([1u8; 20]);
        let addr_b = Address::from_bytes([2u8; 20]);
        GenesisConfig {
            chain_id: 1,
            network_id: "devnet".into(),
            genesis_timestamp_ms: 1_700_000_000_000,
            token: TokenMetadata { name: "Coin".into(), symbol: "COIN".into(), decimals: 18 },
            premine: vec![
                PremineEntry { address: addr_a, amount: Amount::from_u64(1000), description: "A".into() },
                PremineEntry { address: addr_b, amount: Amount::from_u64(0), description: "B".into() },
            ],
            proposer_public_key: proposer.public_key(),
            validators: vec![
                ValidatorEntry { id: "v1".into(), public_key: v1.public_key(), address: Address::from_public_key(&v1.verifying_key()), stake: Amount::from_u64(1), commission_pct: 0 },
                ValidatorEntry { id: "v2".into(), public_key: v2.public_key(), address: Address::from_public_key(&v2.verifying_key()), stake: Amount::from_u64(1), commission_pct: 0 },
                ValidatorEntry { id: "v3".into(), public_key: v3.public_key(), address: Address::from_public_key(&v3.verifying_key()), stake: Amount::from_u64(1), commission_pct: 0 },
            ],
            block_time_ms: 2000,
            genesis_block_reward: Amount::zero(),
            consensus_timeout_ms: 5000,
            watchdog_timeout_ms: 10000,
        }
    }

    #[test]
    fn genesis_is_deterministic() {
        let cfg = sample_config();
        let (b1, s1, c1) = build_genesis(&cfg);
        let (b2, s2, _c2) = build_genesis(&cfg);
        assert_eq!(b1.hash, b2.hash);
        assert_eq!(s1.state_root().unwrap(), s2.state_root().unwrap());
        assert_eq!(c1.required_signatures, 2);
    }

    #[test]
    fn premine_credits_balances() {
        let cfg = sample_config();
        let (_block, state, _config) = build_genesis(&cfg);
        assert_eq!(state.balance_of(&Address::from_bytes([1u8; 20])), Amount::from_u64(1000));
    }

    #[test]
    fn required_signatures_is_two_thirds_ceil() {
        let cfg = sample_config();
        let (_block, _state, config) = build_genesis(&cfg);
        assert_eq!(config.required_signatures, 2);
        assert_eq!(config.validators.len(), 3);
    }
}
