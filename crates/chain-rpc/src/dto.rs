use chain_core::{Block, GenesisConfig};
use chain_crypto::{Address, Amount, Hash256, PublicKey, SignatureBytes};
use serde::{Deserialize, Serialize};

/// The envelope every response body wraps its payload in.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, request_id: uuid::Uuid::new_v4().to_string() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()), request_id: uuid::Uuid::new_v4().to_string() }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitTxRequest {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub signature: SignatureBytes,
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
}

#[derive(Debug, Serialize)]
pub struct SubmitTxResponse {
    #[serde(rename = "txHash")]
    pub tx_hash: Hash256,
    #[serde(rename = "estimatedConfirmationMs")]
    pub estimated_confirmation_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub address: Address,
    pub balance: Amount,
    pub sequence: u64,
    #[serde(rename = "pendingSequence")]
    pub pending_sequence: u64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum TransactionStatusDto {
    Pending,
    Committed { height: u64 },
}

#[derive(Debug, Serialize)]
pub struct TransactionReceipt {
    pub hash: Hash256,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub sequence: u64,
    #[serde(flatten)]
    pub status: TransactionStatusDto,
}

#[derive(Debug, Serialize)]
pub struct LatestBlockSummary {
    pub height: u64,
    pub hash: Hash256,
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    #[serde(rename = "txCount")]
    pub tx_count: u64,
}

impl From<&Block> for LatestBlockSummary {
    fn from(b: &Block) -> Self {
        Self { height: b.header.height, hash: b.hash, timestamp_ms: b.header.timestamp_ms, tx_count: b.header.tx_count }
    }
}

#[derive(Debug, Serialize)]
pub struct NetworkStatus {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "networkId")]
    pub network_id: String,
    #[serde(rename = "latestHeight")]
    pub latest_height: u64,
    #[serde(rename = "latestHash")]
    pub latest_hash: Hash256,
    #[serde(rename = "pendingTxCount")]
    pub pending_tx_count: u64,
    #[serde(rename = "validatorCount")]
    pub validator_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct FaucetRequest {
    pub to: Address,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct InitGenesisRequest {
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub force: bool,
}
