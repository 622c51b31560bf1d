use crate::errors::WalletError;
use chain_crypto::{Address, KeyPair};

/// A wallet's signing identity: a `chain_crypto::KeyPair` plus the hex seed
/// encoding used for `PRIVATE_KEY`/`FAUCET_KEY` style env vars and config
/// files, which never carries a raw `KeyPair` (it isn't `Clone` or
/// serializable by design).
pub struct WalletKeyPair {
    inner: KeyPair,
}

impl WalletKeyPair {
    pub fn generate() -> Self {
        Self { inner: KeyPair::generate() }
    }

    /// Loads a key from its 32-byte seed, hex-encoded with or without a
    /// `0x` prefix.
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, WalletError> {
        let stripped = seed_hex.strip_prefix("0x").unwrap_or(seed_hex);
        let bytes = hex::decode(stripped).map_err(|_| WalletError::InvalidKey)?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| WalletError::InvalidKey)?;
        Ok(Self { inner: KeyPair::from_seed(seed) })
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.inner.verifying_key())
    }

    /// Hex seed suitable for a `PRIVATE_KEY`-style env var; re-running
    /// `from_seed_hex` on it reconstructs this exact identity.
    pub fn seed_hex(&self) -> String {
        self.inner.seed_hex()
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.inner
    }

    pub fn into_keypair(self) -> KeyPair {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_seed_hex_round_trips_a_generated_key() {
        let seed = [7u8; 32];
        let wallet = WalletKeyPair::from_seed_hex(&hex::encode(seed)).unwrap();
        let again = WalletKeyPair::from_seed_hex(&format!("0x{}", hex::encode(seed))).unwrap();
        assert_eq!(wallet.address(), again.address());
    }

    #[test]
    fn malformed_seed_is_rejected() {
        assert!(WalletKeyPair::from_seed_hex("not-hex").is_err());
        assert!(WalletKeyPair::from_seed_hex("abcd").is_err());
    }
}
