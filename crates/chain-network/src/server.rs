use crate::dto::*;
use chain_consensus::{InternalApi, ValidateRequest, Validator};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

fn with_coordinator(
    coordinator: Arc<dyn InternalApi>,
) -> impl Filter<Extract = (Arc<dyn InternalApi>,), Error = Infallible> + Clone {
    warp::any().map(move || coordinator.clone())
}

fn wire<T: serde::Serialize>(result: chain_consensus::Result<T>) -> impl Reply {
    let dto: WireResult<T> = result.map_err(|e| CoordinatorErrorDto::from(&e));
    warp::reply::json(&dto)
}

/// HTTP routes exposing `InternalApi`, the coordinator-side counterpart to
/// `HttpInternalApiClient`. Used when the proposer/validator run outside the
/// coordinator's process; single-process deployment calls `LocalCoordinator`
/// directly and never starts this server.
pub fn internal_api_routes(
    coordinator: Arc<dyn InternalApi>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let base = with_coordinator(coordinator);

    let init_genesis = warp::path!("internal" / "initGenesis")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: InitGenesisRequest, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(wire(c.init_genesis(&req.genesis, req.force).await))
        });

    let restore = warp::path!("internal" / "restore")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: RestoreSnapshotRequest, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(wire(c.restore_snapshot(req.snapshot, req.cid, req.force).await))
        });

    let add_transaction = warp::path!("internal" / "addTransaction")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: AddTransactionRequest, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(wire(c.add_transaction(req.tx).await))
        });

    let acquire_lock = warp::path!("internal" / "acquireProcessingLock")
        .and(warp::post())
        .and(base.clone())
        .and_then(|c: Arc<dyn InternalApi>| async move {
            let result = c.acquire_processing_lock().await.map(|transactions| AcquireLockResponse { transactions });
            Ok::<_, Rejection>(wire(result))
        });

    let release_lock = warp::path!("internal" / "releaseProcessingLock")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: ReleaseLockRequest, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(wire(c.release_processing_lock(req.clear_queue).await))
        });

    let pack_block = warp::path!("internal" / "packBlock")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: PackBlockRequest, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(wire(c.pack_block(req.proposer_id).await))
        });

    let commit_block = warp::path!("internal" / "commitBlock")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: CommitBlockRequest, c: Arc<dyn InternalApi>| async move {
            let result = c.commit_block(req.block).await.map(CommitSummaryDto::from);
            Ok::<_, Rejection>(wire(result))
        });

    let query_state = warp::path!("internal" / "queryState").and(warp::get()).and(base.clone()).and_then(
        |c: Arc<dyn InternalApi>| async move { Ok::<_, Rejection>(warp::reply::json(&c.query_state().await)) },
    );

    let query_pending_count = warp::path!("internal" / "queryPendingCount").and(warp::get()).and(base.clone()).and_then(
        |c: Arc<dyn InternalApi>| async move { Ok::<_, Rejection>(warp::reply::json(&c.query_pending_count().await)) },
    );

    let query_block = warp::path!("internal" / "queryBlock" / u64).and(warp::get()).and(base.clone()).and_then(
        |height: u64, c: Arc<dyn InternalApi>| async move {
            Ok::<_, Rejection>(warp::reply::json(&c.query_block(height).await))
        },
    );

    let query_blocks_range = warp::path!("internal" / "queryBlocksRange")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: BlocksRangeRequest, c: Arc<dyn InternalApi>| async move {
            let blocks: WireResult<Vec<chain_core::Block>> = Ok(c.query_blocks_range(req.start, req.limit).await);
            Ok::<_, Rejection>(warp::reply::json(&blocks))
        });

    let query_latest_block = warp::path!("internal" / "queryLatestBlock").and(warp::get()).and(base.clone()).and_then(
        |c: Arc<dyn InternalApi>| async move { Ok::<_, Rejection>(warp::reply::json(&c.query_latest_block().await)) },
    );

    let query_transaction = warp::path!("internal" / "queryTransaction" / String)
        .and(warp::get())
        .and(base.clone())
        .and_then(|hash: String, c: Arc<dyn InternalApi>| async move {
            let record = match chain_crypto::Hash256::from_hex(&hash) {
                Ok(h) => c.query_transaction(h).await.map(TransactionRecordDto::from),
                Err(_) => None,
            };
            Ok::<_, Rejection>(warp::reply::json(&record))
        });

    let transactions_by_address = warp::path!("internal" / "transactionsByAddress" / String)
        .and(warp::get())
        .and(base.clone())
        .and_then(|addr: String, c: Arc<dyn InternalApi>| async move {
            let records = match chain_crypto::Address::from_hex(&addr) {
                Ok(a) => c.get_transactions_by_address(a).await.into_iter().map(TransactionRecordDto::from).collect(),
                Err(_) => Vec::new(),
            };
            Ok::<_, Rejection>(warp::reply::json(&records))
        });

    let report_error = warp::path!("internal" / "reportError")
        .and(warp::post())
        .and(warp::body::json())
        .and(base)
        .and_then(|req: ReportErrorRequest, c: Arc<dyn InternalApi>| async move {
            c.report_error(req.message).await;
            Ok::<_, Rejection>(warp::reply::json(&WireResult::<()>::Ok(())))
        });

    init_genesis
        .or(restore)
        .or(add_transaction)
        .or(acquire_lock)
        .or(release_lock)
        .or(pack_block)
        .or(commit_block)
        .or(query_state)
        .or(query_pending_count)
        .or(query_block)
        .or(query_blocks_range)
        .or(query_latest_block)
        .or(query_transaction)
        .or(transactions_by_address)
        .or(report_error)
}

/// The validator's own `/internal/validate` route, run alongside
/// `internal_api_routes` when this process hosts a validator.
pub fn validator_routes(validator: Arc<Validator>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("internal" / "validate")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::any().map(move || validator.clone()))
        .and_then(|req: ValidateRequest, v: Arc<Validator>| async move {
            Ok::<_, Rejection>(warp::reply::json(&v.validate(&req.block).await))
        })
}

pub async fn serve(addr: SocketAddr, coordinator: Arc<dyn InternalApi>, validator: Option<Arc<Validator>>) {
    let api = internal_api_routes(coordinator);
    match validator {
        Some(v) => warp::serve(api.or(validator_routes(v))).run(addr).await,
        None => warp::serve(api).run(addr).await,
    }
}
