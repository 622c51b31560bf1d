use crate::errors::WalletError;
use chain_crypto::Address;

/// Parses a `0x`-prefixed hex address as given on a CLI argument or config
/// file, wrapping the crypto crate's own parse error in `WalletError` so
/// callers only need to match one error type.
pub fn parse(address: &str) -> Result<Address, WalletError> {
    Address::from_hex(address).map_err(|_| WalletError::InvalidAddress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_crypto::KeyPair;

    #[test]
    fn parses_an_address_round_tripped_through_hex() {
        let kp = KeyPair::generate();
        let addr = Address::from_public_key(&kp.verifying_key());
        assert_eq!(parse(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("not-an-address").is_err());
    }
}
