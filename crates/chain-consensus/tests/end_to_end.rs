use chain_consensus::backup::NoopBackup;
use chain_consensus::coordinator::LocalCoordinator;
use chain_consensus::error::CoordinatorError;
use chain_consensus::proposer::{Proposer, ValidatorClient};
use chain_consensus::validator::{LocalValidatorClient, ValidateRequest, ValidateResponse, Validator};
use chain_core::{GenesisConfig, PremineEntry, Transaction, TokenMetadata, UnsignedTransaction, ValidatorEntry};
use chain_crypto::{Address, Amount, KeyPair};
use std::sync::Arc;
use std::time::Duration;

fn genesis_config(
    validators: &[KeyPair],
    proposer: &KeyPair,
    premine: &[(Address, u64)],
    consensus_timeout_ms: u64,
    watchdog_timeout_ms: u64,
) -> GenesisConfig {
    GenesisConfig {
        chain_id: 1,
        network_id: "devnet".into(),
        genesis_timestamp_ms: 1_700_000_000_000,
        token: TokenMetadata { name: "Coin".into(), symbol: "COIN".into(), decimals: 18 },
        premine: premine
            .iter()
            .map(|(addr, amount)| PremineEntry {
                address: *addr,
                amount: Amount::from_u64(*amount),
                description: "seed".into(),
            })
            .collect(),
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
        block_time_ms: 2_000,
        genesis_block_reward: Amount::zero(),
        consensus_timeout_ms,
        watchdog_timeout_ms,
    }
}

fn signed_transfer(kp: &KeyPair, to: Address, amount: u64, sequence: u64) -> Transaction {
    let from = Address::from_public_key(&kp.verifying_key());
    let amount = Amount::from_u64(amount);
    let timestamp_ms = chain_consensus::now_ms();
    let preimage = Transaction::sign_preimage(&from, &to, &amount, sequence, timestamp_ms).unwrap();
    let signature = kp.sign(&preimage);
    Transaction::from_signed(
        UnsignedTransaction {
            from,
            to,
            amount,
            sequence,
            timestamp_ms,
            public_key: kp.public_key(),
            gas_price: Amount::zero(),
            gas_limit: 21_000,
        },
        signature,
    )
    .unwrap()
}

fn honest_validators(coordinator: Arc<LocalCoordinator>, keys: Vec<KeyPair>) -> Vec<Arc<dyn ValidatorClient>> {
    keys.into_iter()
        .enumerate()
        .map(|(i, kp)| {
            let v = Validator::new(format!("v{i}"), kp, coordinator.clone());
            Arc::new(LocalValidatorClient(Arc::new(v))) as Arc<dyn ValidatorClient>
        })
        .collect()
}

/// A validator that always votes `valid:false`, used to simulate an honest
/// peer that rejects the block (as distinct from one that is unreachable).
struct RejectingValidatorClient {
    id: String,
}

#[async_trait::async_trait]
impl ValidatorClient for RejectingValidatorClient {
    async fn validate(&self, _request: ValidateRequest) -> std::result::Result<ValidateResponse, String> {
        Ok(ValidateResponse {
            valid: false,
            validator_id: self.id.clone(),
            public_key: None,
            signature: None,
            timestamp_ms: chain_consensus::now_ms(),
            error: Some("rejected by policy".to_string()),
        })
    }
}

/// A validator that never responds, simulating a downed peer. The
/// proposer's per-call timeout discards it the same way a real network
/// failure would.
struct OfflineValidatorClient;

#[async_trait::async_trait]
impl ValidatorClient for OfflineValidatorClient {
    async fn validate(&self, _request: ValidateRequest) -> std::result::Result<ValidateResponse, String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!("offline validator never responds")
    }
}

#[tokio::test]
async fn scenario_1_genesis_then_single_transfer() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let proposer_key = KeyPair::generate();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let b_addr = Address::from_bytes([0xBBu8; 20]);

    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &proposer_key, &[(a_addr, 1000), (b_addr, 0)], 5_000, 60_000), false)
        .await
        .unwrap();

    coordinator
        .add_transaction(signed_transfer(&a, b_addr, 100, 0))
        .await
        .unwrap();

    let clients = honest_validators(coordinator.clone(), validators);
    let proposer = Proposer::new("proposer-1".into(), proposer_key, coordinator.clone(), clients, 5_000, 2);
    let summary = proposer.trigger().await.unwrap().expect("round commits");
    assert_eq!(summary.height, 1);

    let state = coordinator.query_state().await;
    assert_eq!(state.balance_of(&a_addr), Amount::from_u64(900));
    assert_eq!(state.balance_of(&b_addr), Amount::from_u64(100));
    assert_eq!(state.sequence_of(&a_addr), 1);
}

#[tokio::test]
async fn scenario_2_double_submit_same_sequence() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let b_addr = Address::from_bytes([0xBBu8; 20]);
    let c_addr = Address::from_bytes([0xCCu8; 20]);

    let proposer_key = KeyPair::generate();
    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &proposer_key, &[(a_addr, 1000)], 5_000, 60_000), false)
        .await
        .unwrap();
    coordinator
        .add_transaction(signed_transfer(&a, b_addr, 100, 0))
        .await
        .unwrap();

    let clients = honest_validators(coordinator.clone(), validators);
    let proposer = Proposer::new("proposer-1".into(), proposer_key, coordinator.clone(), clients, 5_000, 2);
    proposer.trigger().await.unwrap().expect("first transfer commits");

    let tx_to_b = signed_transfer(&a, b_addr, 50, 1);
    let tx_to_c = signed_transfer(&a, c_addr, 50, 1);
    let (r1, r2) = tokio::join!(
        coordinator.add_transaction(tx_to_b),
        coordinator.add_transaction(tx_to_c)
    );

    let results = [r1, r2];
    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results.iter().filter(|r| *r == &Err(CoordinatorError::SequenceMismatch { expected: 1 })).count();
    assert_eq!(admitted, 1);
    assert_eq!(rejected, 1);
}

#[tokio::test]
async fn scenario_3_insufficient_balance_is_rejected_at_admission() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let b_addr = Address::from_bytes([0xBBu8; 20]);

    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &KeyPair::generate(), &[(a_addr, 50)], 5_000, 60_000), false)
        .await
        .unwrap();

    let result = coordinator.add_transaction(signed_transfer(&a, b_addr, 100, 0)).await;
    assert_eq!(result, Err(CoordinatorError::InsufficientBalance));

    let state = coordinator.query_state().await;
    assert_eq!(state.balance_of(&a_addr), Amount::from_u64(50));
}

#[tokio::test]
async fn scenario_4_quorum_loss_then_recovery() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let b_addr = Address::from_bytes([0xBBu8; 20]);

    let proposer_key = KeyPair::generate();
    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &proposer_key, &[(a_addr, 1000)], 5_000, 60_000), false)
        .await
        .unwrap();
    coordinator
        .add_transaction(signed_transfer(&a, b_addr, 100, 0))
        .await
        .unwrap();

    // None of the fan-out targets cast a usable vote: one rejects outright,
    // the others are unreachable, leaving the round well short of quorum.
    let failing_clients: Vec<Arc<dyn ValidatorClient>> = vec![
        Arc::new(RejectingValidatorClient { id: "v0".into() }),
        Arc::new(RejectingValidatorClient { id: "v1".into() }),
        Arc::new(OfflineValidatorClient),
    ];
    let proposer = Proposer::new(
        "proposer-1".into(),
        KeyPair::generate(),
        coordinator.clone(),
        failing_clients,
        200,
        2,
    );
    let err = proposer.trigger().await.expect_err("quorum should not be reached");
    assert!(matches!(
        err,
        chain_consensus::error::ProposerError::InsufficientSignatures { required: 2, received, .. } if received < 2
    ));

    // Queue still holds the transaction; a fully-honest fleet succeeds next time.
    let clients = honest_validators(coordinator.clone(), validators);
    let recovery_proposer = Proposer::new("proposer-1".into(), proposer_key, coordinator.clone(), clients, 5_000, 2);
    let summary = recovery_proposer.trigger().await.unwrap().expect("recovers once validators are honest");
    assert_eq!(summary.tx_count, 1);
}

#[tokio::test]
async fn scenario_5_watchdog_rescue_via_stale_lock_takeover() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let b_addr = Address::from_bytes([0xBBu8; 20]);

    let proposer_key = KeyPair::generate();
    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &proposer_key, &[(a_addr, 1000)], 100, 60_000), false)
        .await
        .unwrap();
    coordinator
        .add_transaction(signed_transfer(&a, b_addr, 100, 0))
        .await
        .unwrap();

    // Simulate a proposer that packs a block and then crashes: the lock is
    // acquired and the block built, but `commitBlock` never runs.
    coordinator.acquire_processing_lock().await.unwrap();
    let _abandoned_block = coordinator.pack_block("crashed-proposer".into()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;

    let clients = honest_validators(coordinator.clone(), validators);
    let proposer = Proposer::new("proposer-2".into(), proposer_key, coordinator.clone(), clients, 100, 2);
    let summary = proposer.trigger().await.unwrap().expect("stale lock is retaken");
    assert_eq!(summary.height, 1);
    assert_eq!(summary.tx_count, 1);
}

#[tokio::test]
async fn scenario_6_batch_of_twenty() {
    let validators: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let a = KeyPair::generate();
    let a_addr = Address::from_public_key(&a.verifying_key());
    let dummy = Address::from_bytes([0xDDu8; 20]);

    let proposer_key = KeyPair::generate();
    let coordinator = LocalCoordinator::new(Arc::new(NoopBackup), 60_000);
    coordinator
        .init_genesis(&genesis_config(&validators, &proposer_key, &[(a_addr, 10_000)], 5_000, 60_000), false)
        .await
        .unwrap();

    for seq in 0..20u64 {
        coordinator
            .add_transaction(signed_transfer(&a, dummy, 10, seq))
            .await
            .unwrap();
    }

    let clients = honest_validators(coordinator.clone(), validators);
    let proposer = Proposer::new("proposer-1".into(), proposer_key, coordinator.clone(), clients, 5_000, 2);
    let summary = proposer.trigger().await.unwrap().expect("batch commits");
    assert_eq!(summary.tx_count, 20);

    let state = coordinator.query_state().await;
    assert_eq!(state.balance_of(&dummy), Amount::from_u64(200));
    assert_eq!(state.sequence_of(&a_addr), 20);
}
