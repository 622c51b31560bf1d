use chain_consensus::{InternalApi, LocalCoordinator, NoopBackup, Validator, ValidatorClient};
use chain_core::{GenesisConfig, PremineEntry, TokenMetadata, Transaction, UnsignedTransaction, ValidatorEntry};
use chain_crypto::{Address, Amount, KeyPair};
use chain_network::{server, HttpInternalApiClient, HttpValidatorClient};
use std::net::SocketAddr;
use std::sync::Arc;

fn sample_genesis(validators: &[KeyPair], premine: Address, balance: u64) -> GenesisConfig {
    GenesisConfig {
        chain_id: 1,
        network_id: "devnet".into(),
        genesis_timestamp_ms: 1_700_000_000_000,
        token: TokenMetadata { name: "Coin".into(), symbol: "COIN".into(), decimals: 18 },
        premine: vec![PremineEntry { address: premine, amount: Amount::from_u64(balance), description: "faucet".into() }],
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
        watchdog_timeout_ms: 60_000,
    }
}

fn signed_transfer(kp: &KeyPair, to: Address, amount: u64, sequence: u64) -> Transaction {
    let from = Address::from_public_key(&kp.verifying_key());
    let amount = Amount::from_u64(amount);
    let timestamp_ms = chain_consensus::now_ms();
    let preimage = Transaction::sign_preimage(&from, &to, &amount, sequence, timestamp_ms).unwrap();
    let signature = kp.sign(&preimage);
    Transaction::from_signed(
        UnsignedTransaction { from, to, amount, sequence, timestamp_ms, public_key: kp.public_key(), gas_price: Amount::zero(), gas_limit: 21_000 },
        signature,
    )
    .unwrap()
}

#[tokio::test]
async fn internal_api_round_trips_over_http() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let sender = KeyPair::generate();
    let sender_addr = Address::from_public_key(&sender.verifying_key());

    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator.init_genesis(&sample_genesis(&validators, sender_addr, 1_000), false).await.unwrap();
    let coordinator: Arc<dyn InternalApi> = coordinator;

    let addr: SocketAddr = "127.0.0.1:38080".parse().unwrap();
    tokio::spawn(server::serve(addr, coordinator, None));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let client = HttpInternalApiClient::new(format!("http://{addr}"));
    let recipient = Address::from_bytes([3u8; 20]);
    client.add_transaction(signed_transfer(&sender, recipient, 10, 0)).await.unwrap();

    let state = client.query_state().await;
    assert_eq!(state.latest_height, 0);
}

#[tokio::test]
async fn validator_round_trips_over_http() {
    let mut validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let sender = KeyPair::generate();
    let sender_addr = Address::from_public_key(&sender.verifying_key());

    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator.init_genesis(&sample_genesis(&validators, sender_addr, 1_000), false).await.unwrap();
    let internal_coordinator: Arc<dyn InternalApi> = coordinator.clone();

    let v0_key = validators.remove(0);
    let validator = Arc::new(Validator::new("v0".into(), v0_key, internal_coordinator.clone()));

    let addr: SocketAddr = "127.0.0.1:38081".parse().unwrap();
    tokio::spawn(server::serve(addr, internal_coordinator, Some(validator)));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let client = HttpValidatorClient::new(format!("http://{addr}"));

    coordinator
        .add_transaction(signed_transfer(&sender, Address::from_bytes([4u8; 20]), 5, 0))
        .await
        .unwrap();
    let txs = coordinator.acquire_processing_lock().await.unwrap();
    let mut block = coordinator.pack_block("proposer-1".into()).await.unwrap();
    assert_eq!(block.transactions.len(), txs.len());
    block.proposer_signature = Some(block.sign(&KeyPair::generate()));

    let response = client
        .validate(chain_consensus::ValidateRequest { block, proposer_id: "proposer-1".into() })
        .await
        .unwrap();
    assert!(response.valid);
}
