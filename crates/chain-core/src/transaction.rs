use crate::error::{CoreError, Result};
use chain_crypto::{canonical::hash_canonical, Address, Amount, Hash256, PublicKey, SignatureBytes};
use serde::{Deserialize, Serialize};

/// A signed transfer transaction. `hash` is SHA-256 over the canonical JSON
/// of every other field; `signature` covers only the narrower
/// `{from, to, amount, sequence, timestamp_ms}` pre-image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub hash: Hash256,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub sequence: u64,
    pub timestamp_ms: u64,
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
    pub signature: SignatureBytes,
    #[serde(rename = "gasPrice", default = "default_gas_price")]
    pub gas_price: Amount,
    #[serde(rename = "gasLimit", default = "default_gas_limit")]
    pub gas_limit: u64,
}

fn default_gas_price() -> Amount {
    Amount::zero()
}

fn default_gas_limit() -> u64 {
    21_000
}

/// The pre-image hashed to produce `Transaction::hash`: every field but the
/// hash itself.
#[derive(Serialize)]
struct HashPreimage<'a> {
    from: &'a Address,
    to: &'a Address,
    amount: &'a Amount,
    sequence: u64,
    timestamp_ms: u64,
    #[serde(rename = "publicKey")]
    public_key: &'a PublicKey,
    signature: &'a SignatureBytes,
    #[serde(rename = "gasPrice")]
    gas_price: &'a Amount,
    #[serde(rename = "gasLimit")]
    gas_limit: u64,
}

/// The narrower pre-image a sender actually signs.
#[derive(Serialize)]
struct SignPreimage<'a> {
    from: &'a Address,
    to: &'a Address,
    amount: &'a Amount,
    sequence: u64,
    timestamp_ms: u64,
}

/// Fields supplied by a client constructing an unsigned transaction.
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub public_key: PublicKey,
    pub gas_price: Amount,
    pub gas_limit: u64,
}

impl Transaction {
    /// Builds the pre-image a client signs to authorize this transaction.
    pub fn sign_preimage(
        from: &Address,
        to: &Address,
        amount: &Amount,
        sequence: u64,
        timestamp_ms: u64,
    ) -> Result<Vec<u8>> {
        Ok(chain_crypto::canonical::canonical_bytes(&SignPreimage {
            from,
            to,
            amount,
            sequence,
            timestamp_ms,
        })?)
    }

    /// Assembles a fully-signed transaction from an unsigned one plus the
    /// signature a client produced over `sign_preimage`.
    pub fn from_signed(unsigned: UnsignedTransaction, signature: SignatureBytes) -> Result<Self> {
        let mut tx = Transaction {
            hash: Hash256::zero(),
            from: unsigned.from,
            to: unsigned.to,
            amount: unsigned.amount,
            sequence: unsigned.sequence,
            timestamp_ms: unsigned.timestamp_ms,
            public_key: unsigned.public_key,
            signature,
            gas_price: unsigned.gas_price,
            gas_limit: unsigned.gas_limit,
        };
        tx.hash = tx.compute_hash()?;
        Ok(tx)
    }

    fn compute_hash(&self) -> Result<Hash256> {
        Ok(hash_canonical(&HashPreimage {
            from: &self.from,
            to: &self.to,
            amount: &self.amount,
            sequence: self.sequence,
            timestamp_ms: self.timestamp_ms,
            public_key: &self.public_key,
            signature: &self.signature,
            gas_price: &self.gas_price,
            gas_limit: self.gas_limit,
        })?)
    }

    /// Re-derives `hash` and compares against the stored value.
    pub fn verify_hash(&self) -> Result<()> {
        if self.compute_hash()? != self.hash {
            return Err(CoreError::BadTransactionHash);
        }
        Ok(())
    }

    /// Checks that `from` is the address derived from `public_key`.
    pub fn verify_address(&self) -> Result<()> {
        if Address::from_public_key(self.public_key.inner()) != self.from {
            return Err(CoreError::AddressMismatch);
        }
        Ok(())
    }

    /// Verifies the signature over the narrower sign pre-image.
    pub fn verify_signature(&self) -> Result<()> {
        let preimage = Self::sign_preimage(
            &self.from,
            &self.to,
            &self.amount,
            self.sequence,
            self.timestamp_ms,
        )?;
        if !chain_crypto::verify(&self.public_key, &preimage, &self.signature) {
            return Err(CoreError::InvalidSignature);
        }
        Ok(())
    }

    /// Runs every structural/cryptographic check a fresh transaction must
    /// pass before coordinator-level (sequence/balance) admission.
    pub fn verify_well_formed(&self) -> Result<()> {
        self.verify_hash()?;
        self.verify_address()?;
        self.verify_signature()?;
        Ok(())
    }
}
