use crate::errors::WalletError;
use crate::keypair::WalletKeyPair;
use chain_core::{Transaction, UnsignedTransaction};
use chain_crypto::{Address, Amount};

/// Builds and signs a transfer from a wallet's own keypair, producing the
/// same `Transaction` shape the façade's `/tx/submit` accepts — a client
/// using this crate signs locally and only ever sends the finished,
/// already-hashed transaction over the wire.
pub struct WalletTransaction;

impl WalletTransaction {
    pub fn build(
        sender: &WalletKeyPair,
        to: Address,
        amount: Amount,
        sequence: u64,
        timestamp_ms: u64,
    ) -> Result<Transaction, WalletError> {
        let from = sender.address();
        let preimage = Transaction::sign_preimage(&from, &to, &amount, sequence, timestamp_ms)?;
        let signature = sender.keypair().sign(&preimage);
        Ok(Transaction::from_signed(
            UnsignedTransaction {
                from,
                to,
                amount,
                sequence,
                timestamp_ms,
                public_key: sender.keypair().public_key(),
                gas_price: Amount::zero(),
                gas_limit: 21_000,
            },
            signature,
        )?)
    }
}
