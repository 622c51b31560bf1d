use chain_consensus::{LocalCoordinator, LocalValidatorClient, NoopBackup, Proposer, Validator, ValidatorClient};
use chain_core::{GenesisConfig, PremineEntry, TokenMetadata, ValidatorEntry};
use chain_crypto::{Address, Amount, KeyPair};
use chain_rpc::{serve, RpcHandler};
use std::net::SocketAddr;
use std::sync::Arc;

fn sample_genesis(validators: &[KeyPair], proposer: &KeyPair, premine: Address, balance: u64) -> GenesisConfig {
    GenesisConfig {
        chain_id: 7,
        network_id: "devnet".into(),
        genesis_timestamp_ms: 1_700_000_000_000,
        token: TokenMetadata { name: "Coin".into(), symbol: "COIN".into(), decimals: 18 },
        premine: vec![PremineEntry { address: premine, amount: Amount::from_u64(balance), description: "faucet".into() }],
        proposer_public_key: proposer.public_key(),
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

#[tokio::test]
async fn submit_tx_is_committed_and_visible_over_http() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let proposer_key = KeyPair::generate();
    let faucet_key = Arc::new(KeyPair::generate());
    let faucet_addr = Address::from_public_key(&faucet_key.verifying_key());

    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator.init_genesis(&sample_genesis(&validators, &proposer_key, faucet_addr, 1_000), false).await.unwrap();
    let coordinator_dyn: Arc<dyn chain_consensus::InternalApi> = coordinator.clone();

    let validator_clients: Vec<Arc<dyn ValidatorClient>> = validators
        .into_iter()
        .enumerate()
        .map(|(i, kp)| {
            let v = Validator::new(format!("v{i}"), kp, coordinator_dyn.clone());
            Arc::new(LocalValidatorClient(Arc::new(v))) as Arc<dyn ValidatorClient>
        })
        .collect();

    let proposer = Arc::new(Proposer::new(
        "proposer-0".into(),
        proposer_key,
        coordinator_dyn.clone(),
        validator_clients,
        5_000,
        2,
    ));

    let handler = Arc::new(RpcHandler::new(
        coordinator_dyn,
        proposer,
        7,
        "devnet".into(),
        false,
        3,
        Some(faucet_key),
    ));

    let addr: SocketAddr = "127.0.0.1:38090".parse().unwrap();
    tokio::spawn(serve(addr, handler));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let health: serde_json::Value =
        client.get(format!("http://{addr}/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["success"], true);

    let faucet_resp: serde_json::Value = client
        .post(format!("http://{addr}/faucet"))
        .json(&serde_json::json!({"to": Address::from_bytes([1u8; 20]).to_hex(), "amount": "50"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(faucet_resp["success"], true, "faucet response: {faucet_resp:?}");

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let status: serde_json::Value =
        client.get(format!("http://{addr}/status")).send().await.unwrap().json().await.unwrap();
    assert_eq!(status["data"]["latestHeight"], 1, "status response: {status:?}");
}
