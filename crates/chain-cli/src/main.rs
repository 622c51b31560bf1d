mod config;

use chain_consensus::{LocalCoordinator, LocalValidatorClient, NoopBackup, Proposer, Validator, ValidatorClient};
use chain_crypto::KeyPair;
use chain_rpc::RpcHandler;
use chain_storage::{BackupService, InMemoryIndexStore, InMemoryObjectStore};
use chain_wallet::WalletKeyPair;
use clap::{Parser, Subcommand};
use config::NodeConfig;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "chain-node")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the coordinator, every validator, the proposer, and the HTTP
    /// façade in one process, wired from a node config and the private keys
    /// in the environment.
    Start {
        #[arg(long, default_value = "node.toml")]
        config: PathBuf,
    },
    /// Generates a fresh Ed25519 key pair and prints its hex seed and
    /// derived address, for seeding `PRIVATE_KEY`-style env vars or a
    /// genesis validator/premine entry.
    Keygen,
}

fn env_keypair(var: &str) -> anyhow::Result<KeyPair> {
    let seed_hex = std::env::var(var).map_err(|_| anyhow::anyhow!("missing required env var {var}"))?;
    Ok(WalletKeyPair::from_seed_hex(&seed_hex).map_err(|e| anyhow::anyhow!("{var}: {e}"))?.into_keypair())
}

fn env_keypair_optional(var: &str) -> anyhow::Result<Option<KeyPair>> {
    match std::env::var(var) {
        Ok(seed_hex) => {
            Ok(Some(WalletKeyPair::from_seed_hex(&seed_hex).map_err(|e| anyhow::anyhow!("{var}: {e}"))?.into_keypair()))
        }
        Err(_) => Ok(None),
    }
}

fn env_backup_key() -> anyhow::Result<Option<[u8; 32]>> {
    match std::env::var("BACKUP_ENCRYPTION_KEY") {
        Ok(hex_key) => {
            let stripped = hex_key.strip_prefix("0x").unwrap_or(&hex_key);
            let bytes = hex::decode(stripped).map_err(|e| anyhow::anyhow!("BACKUP_ENCRYPTION_KEY: {e}"))?;
            let arr: [u8; 32] =
                bytes.try_into().map_err(|_| anyhow::anyhow!("BACKUP_ENCRYPTION_KEY must be 32 bytes"))?;
            Ok(Some(arr))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            let wallet = WalletKeyPair::generate();
            println!("seed: {}", wallet.seed_hex());
            println!("address: {}", wallet.address());
            println!("note: the seed above is the only copy; this key isn't persisted anywhere.");
        }
        Commands::Start { config } => run_node(config).await?,
    }
    Ok(())
}

async fn run_node(config_path: PathBuf) -> anyhow::Result<()> {
    let node_config = NodeConfig::load(&config_path)?;
    let genesis = &node_config.genesis;

    let backup: Arc<dyn chain_consensus::BackupTrigger> = match env_backup_key()? {
        Some(key) => {
            tracing::info!("backup encryption key present, enabling periodic snapshot backups");
            Arc::new(BackupService::new(Arc::new(InMemoryObjectStore::new()), Arc::new(InMemoryIndexStore::new()), key))
        }
        None => {
            tracing::info!("no BACKUP_ENCRYPTION_KEY set, backups disabled");
            Arc::new(NoopBackup)
        }
    };

    let coordinator = LocalCoordinator::new(backup, node_config.backup_interval_ms);
    coordinator.init_genesis(genesis, false).await.or_else(|e| match e {
        chain_consensus::CoordinatorError::AlreadyInitialised => Ok(()),
        other => Err(other),
    })?;
    let coordinator_dyn: Arc<dyn chain_consensus::InternalApi> = coordinator;

    let mut validator_clients: Vec<Arc<dyn ValidatorClient>> = Vec::with_capacity(genesis.validators.len());
    for entry in &genesis.validators {
        let env_name = format!("{}_PRIVATE_KEY", entry.id.to_uppercase());
        let keypair = env_keypair(&env_name)?;
        if keypair.public_key() != entry.public_key {
            anyhow::bail!("{env_name} does not match the public key declared for validator {}", entry.id);
        }
        let validator = Validator::new(entry.id.clone(), keypair, coordinator_dyn.clone());
        validator_clients.push(Arc::new(LocalValidatorClient(Arc::new(validator))));
    }

    let proposer_keypair = env_keypair("PROPOSER_PRIVATE_KEY")?;
    if proposer_keypair.public_key() != genesis.proposer_public_key {
        anyhow::bail!("PROPOSER_PRIVATE_KEY does not match the proposer public key declared in genesis");
    }
    let proposer = Arc::new(Proposer::new(
        "proposer-0".into(),
        proposer_keypair,
        coordinator_dyn.clone(),
        validator_clients,
        genesis.consensus_timeout_ms,
        chain_core::ConsensusConfig::required_signatures_for(genesis.validators.len()),
    ));

    let faucet_key = env_keypair_optional("FAUCET_KEY")?.map(Arc::new);
    if node_config.mainnet && faucet_key.is_some() {
        tracing::warn!("FAUCET_KEY set on a mainnet-tagged network; /faucet will still refuse at runtime");
    }

    let handler = Arc::new(RpcHandler::new(
        coordinator_dyn,
        proposer,
        genesis.chain_id as u64,
        genesis.network_id.clone(),
        node_config.mainnet,
        genesis.validators.len(),
        faucet_key,
    ));

    let addr: std::net::SocketAddr = node_config.rpc_bind.parse()?;
    tracing::info!(%addr, chain_id = genesis.chain_id, "starting chain node");
    chain_rpc::serve(addr, handler).await;
    Ok(())
}
