use crate::error::{CoreError, Result};
use crate::transaction::Transaction;
use chain_crypto::{canonical::hash_canonical, merkle_root, Address, Hash256, PublicKey, SignatureBytes};
use serde::{Deserialize, Serialize};

/// Logical identifier for a validator or proposer role (distinct from its
/// cryptographic address — a node may rotate keys without changing id).
pub type NodeId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    pub timestamp_ms: u64,
    #[serde(rename = "prevHash")]
    pub prev_hash: Hash256,
    #[serde(rename = "txRoot")]
    pub tx_root: Hash256,
    #[serde(rename = "stateRoot")]
    pub state_root: Hash256,
    pub proposer: NodeId,
    #[serde(rename = "txCount")]
    pub tx_count: u64,
}

impl BlockHeader {
    /// `Block::hash` is SHA-256 over the canonical JSON of the header alone.
    pub fn compute_hash(&self) -> Result<Hash256> {
        Ok(hash_canonical(self)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    #[serde(rename = "validatorId")]
    pub validator_id: NodeId,
    #[serde(rename = "validatorPubKey")]
    pub validator_pub_key: PublicKey,
    pub signature: SignatureBytes,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: Hash256,
    #[serde(rename = "proposerSignature")]
    pub proposer_signature: Option<SignatureBytes>,
    pub votes: Vec<Vote>,
}

/// The ASCII pre-image signed by both proposer and validators over a
/// candidate block: `"block:" + hex(hash)`.
pub fn block_sign_preimage(hash: &Hash256) -> Vec<u8> {
    format!("block:{}", hash.to_hex()).into_bytes()
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Result<Self> {
        let hash = header.compute_hash()?;
        Ok(Self {
            header,
            transactions,
            hash,
            proposer_signature: None,
            votes: Vec::new(),
        })
    }

    pub fn tx_hashes(&self) -> Vec<Hash256> {
        self.transactions.iter().map(|t| t.hash).collect()
    }

    pub fn compute_tx_root(&self) -> Hash256 {
        merkle_root(&self.tx_hashes())
    }

    /// Re-derives `hash` from the header and compares it to the stored
    /// value.
    pub fn verify_hash(&self) -> Result<()> {
        if self.header.compute_hash()? != self.hash {
            return Err(CoreError::BadHash);
        }
        Ok(())
    }

    pub fn verify_tx_count(&self) -> Result<()> {
        if self.transactions.len() as u64 != self.header.tx_count {
            return Err(CoreError::TxCountMismatch);
        }
        Ok(())
    }

    pub fn verify_tx_root(&self) -> Result<()> {
        if self.compute_tx_root() != self.header.tx_root {
            return Err(CoreError::BadTxRoot);
        }
        Ok(())
    }

    /// Signs this block on behalf of `signer` (proposer or validator) over
    /// `"block:" + hex(hash)`.
    pub fn sign(&self, signer: &chain_crypto::KeyPair) -> SignatureBytes {
        signer.sign(&block_sign_preimage(&self.hash))
    }

    pub fn verify_vote_signature(&self, vote: &Vote) -> bool {
        chain_crypto::verify(
            &vote.validator_pub_key,
            &block_sign_preimage(&self.hash),
            &vote.signature,
        )
    }

    pub fn verify_proposer_signature(&self, proposer_key: &PublicKey) -> bool {
        match &self.proposer_signature {
            Some(sig) => chain_crypto::verify(proposer_key, &block_sign_preimage(&self.hash), sig),
            None => false,
        }
    }

    /// Distinct validator addresses that produced a vote, used by quorum
    /// counting to reject duplicate signers.
    pub fn distinct_voter_addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self
            .votes
            .iter()
            .map(|v| Address::from_public_key(v.validator_pub_key.inner()))
            .collect();
        addrs.sort();
        addrs.dedup();
        addrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(height: u64) -> BlockHeader {
        BlockHeader {
            height,
            timestamp_ms: 1_700_000_000_000,
            prev_hash: Hash256::zero(),
            tx_root: Hash256::digest(b""),
            state_root: Hash256::digest(b"state"),
            proposer: "node-1".to_string(),
            tx_count: 0,
        }
    }

    #[test]
    fn hash_is_over_header_only() {
        let h = header(1);
        let block = Block::new(h.clone(), vec![]).unwrap();
        assert_eq!(block.hash, h.compute_hash().unwrap());
    }

    #[test]
    fn single_tx_block_tx_root_is_the_tx_hash() {
        // tx_root over a single leaf equals that leaf, per the shared Merkle rule.
        let leaf = Hash256::digest(b"tx-1");
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let kp = chain_crypto::KeyPair::generate();
        let block = Block::new(header(1), vec![]).unwrap();
        let sig = block.sign(&kp);
        let vote = Vote {
            validator_id: "v1".into(),
            validator_pub_key: kp.public_key(),
            signature: sig,
            timestamp_ms: 0,
        };
        assert!(block.verify_vote_signature(&vote));
    }

    #[test]
    fn tampered_header_breaks_hash_check() {
        let mut block = Block::new(header(1), vec![]).unwrap();
        block.header.height = 2;
        assert_eq!(block.verify_hash(), Err(CoreError::BadHash));
    }
}
