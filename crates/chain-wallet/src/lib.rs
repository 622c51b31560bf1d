pub mod address;
pub mod errors;
pub mod keypair;
pub mod transaction;

pub use errors::WalletError;
pub use keypair::WalletKeyPair;
pub use transaction::WalletTransaction;
