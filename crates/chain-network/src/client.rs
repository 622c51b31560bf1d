use crate::dto::*;
use crate::errors::NetworkError;
use async_trait::async_trait;
use chain_consensus::{
    CommitSummary, CoordinatorError, InternalApi, TransactionRecord, ValidateRequest, ValidateResponse, ValidatorClient,
};
use chain_core::{Block, NodeId, Transaction, WorldState};
use chain_crypto::{Address, Hash256};

/// Fans a candidate block out to one remote validator's `/validate` route.
/// The in-process counterpart is `chain_consensus::LocalValidatorClient`.
pub struct HttpValidatorClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpValidatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }
}

#[async_trait]
impl ValidatorClient for HttpValidatorClient {
    async fn validate(&self, request: ValidateRequest) -> std::result::Result<ValidateResponse, String> {
        self.http
            .post(format!("{}/internal/validate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json::<ValidateResponse>()
            .await
            .map_err(|e| e.to_string())
    }
}

/// Satisfies `InternalApi` over HTTP, for a proposer or validator running in
/// a different process than the coordinator. `LocalCoordinator` satisfies
/// the same trait directly for single-process deployment.
pub struct HttpInternalApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpInternalApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    async fn post<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<WireResult<Resp>, NetworkError> {
        let resp = self.http.post(format!("{}{}", self.base_url, path)).json(body).send().await?;
        resp.json::<WireResult<Resp>>().await.map_err(|e| NetworkError::Malformed(e.to_string()))
    }

    async fn get<Resp: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Resp, NetworkError> {
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        resp.json::<Resp>().await.map_err(|e| NetworkError::Malformed(e.to_string()))
    }

    fn into_coordinator_result<T>(r: Result<WireResult<T>, NetworkError>) -> chain_consensus::Result<T> {
        match r {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(dto)) => Err(CoordinatorError::from(dto)),
            Err(e) => Err(CoordinatorError::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl InternalApi for HttpInternalApiClient {
    async fn init_genesis(&self, genesis: &chain_core::GenesisConfig, force: bool) -> chain_consensus::Result<()> {
        Self::into_coordinator_result(
            self.post("/internal/initGenesis", &InitGenesisRequest { genesis: genesis.clone(), force }).await,
        )
    }

    async fn restore_snapshot(
        &self,
        snapshot: chain_core::ChainSnapshot,
        cid: String,
        force: bool,
    ) -> chain_consensus::Result<()> {
        Self::into_coordinator_result(
            self.post("/internal/restore", &RestoreSnapshotRequest { snapshot, cid, force }).await,
        )
    }

    async fn add_transaction(&self, tx: Transaction) -> chain_consensus::Result<()> {
        Self::into_coordinator_result(self.post("/internal/addTransaction", &AddTransactionRequest { tx }).await)
    }

    async fn acquire_processing_lock(&self) -> chain_consensus::Result<Vec<Transaction>> {
        let r: Result<WireResult<AcquireLockResponse>, NetworkError> =
            self.post("/internal/acquireProcessingLock", &()).await;
        Self::into_coordinator_result(r).map(|resp| resp.transactions)
    }

    async fn release_processing_lock(&self, clear_queue: bool) -> chain_consensus::Result<()> {
        Self::into_coordinator_result(
            self.post("/internal/releaseProcessingLock", &ReleaseLockRequest { clear_queue }).await,
        )
    }

    async fn pack_block(&self, proposer_id: NodeId) -> chain_consensus::Result<Block> {
        Self::into_coordinator_result(self.post("/internal/packBlock", &PackBlockRequest { proposer_id }).await)
    }

    async fn commit_block(&self, block: Block) -> chain_consensus::Result<CommitSummary> {
        let r: Result<WireResult<CommitSummaryDto>, NetworkError> =
            self.post("/internal/commitBlock", &CommitBlockRequest { block }).await;
        Self::into_coordinator_result(r).map(CommitSummary::from)
    }

    async fn query_state(&self) -> WorldState {
        match self.get("/internal/queryState").await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "remote coordinator unreachable for queryState");
                WorldState::new()
            }
        }
    }

    async fn query_pending_count(&self) -> usize {
        self.get("/internal/queryPendingCount").await.unwrap_or(0)
    }

    async fn query_block(&self, height: u64) -> Option<Block> {
        self.get(&format!("/internal/queryBlock/{height}")).await.unwrap_or(None)
    }

    async fn query_blocks_range(&self, start: u64, limit: usize) -> Vec<Block> {
        let r: Result<WireResult<Vec<Block>>, NetworkError> =
            self.post("/internal/queryBlocksRange", &BlocksRangeRequest { start, limit }).await;
        r.ok().and_then(|inner| inner.ok()).unwrap_or_default()
    }

    async fn query_latest_block(&self) -> Option<Block> {
        self.get("/internal/queryLatestBlock").await.unwrap_or(None)
    }

    async fn query_transaction(&self, hash: Hash256) -> Option<TransactionRecord> {
        self.get::<Option<TransactionRecordDto>>(&format!("/internal/queryTransaction/{}", hash.to_hex()))
            .await
            .unwrap_or(None)
            .map(TransactionRecord::from)
    }

    async fn get_transactions_by_address(&self, addr: Address) -> Vec<TransactionRecord> {
        self.get::<Vec<TransactionRecordDto>>(&format!("/internal/transactionsByAddress/{addr}"))
            .await
            .unwrap_or_default()
            .into_iter()
            .map(TransactionRecord::from)
            .collect()
    }

    async fn report_error(&self, message: String) {
        let _: Result<WireResult<()>, NetworkError> =
            self.post("/internal/reportError", &ReportErrorRequest { message }).await;
    }
}
