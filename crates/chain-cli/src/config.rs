use chain_core::GenesisConfig;
use serde::Deserialize;
use std::path::Path;

/// The node's own TOML config: everything except private keys, which only
/// ever come from the environment.
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_rpc_bind")]
    pub rpc_bind: String,
    #[serde(default)]
    pub mainnet: bool,
    #[serde(default = "default_backup_interval_ms")]
    pub backup_interval_ms: u64,
    pub genesis: GenesisConfig,
}

fn default_rpc_bind() -> String {
    "127.0.0.1:8080".into()
}

fn default_backup_interval_ms() -> u64 {
    300_000
}

impl NodeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading node config {}: {e}", path.display()))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing node config {}: {e}", path.display()))
    }
}
