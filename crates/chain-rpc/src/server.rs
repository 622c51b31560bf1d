use crate::dto::*;
use crate::errors::RpcError;
use crate::handlers::RpcHandler;
use chain_crypto::{Address, Hash256};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

/// Wraps every response in the `{success, data, error, requestId}` envelope
/// and maps a handler error onto its fixed HTTP status.
fn ok<T: Serialize>(value: T) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&Envelope::ok(value)), warp::http::StatusCode::OK)
}

fn err(e: RpcError) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&Envelope::<()>::err(e.to_string())), e.status())
}

fn with_handler(handler: Arc<RpcHandler>) -> impl Filter<Extract = (Arc<RpcHandler>,), Error = Infallible> + Clone {
    warp::any().map(move || handler.clone())
}

/// The client-facing HTTP surface, each route wrapped in the response
/// envelope and fixed status mapping.
pub fn routes(handler: Arc<RpcHandler>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let base = with_handler(handler);

    let health = warp::path!("health").and(warp::get()).and(base.clone()).map(|h: Arc<RpcHandler>| ok(h.health()));

    let status = warp::path!("status")
        .and(warp::get())
        .and(base.clone())
        .and_then(|h: Arc<RpcHandler>| async move { Ok::<_, Rejection>(ok(h.status().await)) });

    let submit_tx = warp::path!("tx" / "submit")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: SubmitTxRequest, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match h.submit_tx(req).await {
                Ok(resp) => ok(resp),
                Err(e) => err(e),
            })
        });

    let tx_receipt = warp::path!("tx" / String).and(warp::get()).and(base.clone()).and_then(
        |hash: String, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match Hash256::from_hex(&hash) {
                Ok(hash) => match h.tx_receipt(hash).await {
                    Ok(receipt) => ok(receipt),
                    Err(e) => err(e),
                },
                Err(_) => err(RpcError::MalformedRequest),
            })
        },
    );

    let account_txs = warp::path!("account" / String / "txs").and(warp::get()).and(base.clone()).and_then(
        |addr: String, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match Address::from_hex(&addr) {
                Ok(addr) => ok(h.account_txs(addr).await),
                Err(_) => err(RpcError::MalformedRequest),
            })
        },
    );

    let account_info = warp::path!("account" / String).and(warp::get()).and(base.clone()).and_then(
        |addr: String, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match Address::from_hex(&addr) {
                Ok(addr) => ok(h.account_info(addr).await),
                Err(_) => err(RpcError::MalformedRequest),
            })
        },
    );

    let latest_block = warp::path!("block" / "latest").and(warp::get()).and(base.clone()).and_then(
        |h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match h.latest_block().await {
                Ok(summary) => ok(summary),
                Err(e) => err(e),
            })
        },
    );

    let block_by_height = warp::path!("block" / u64).and(warp::get()).and(base.clone()).and_then(
        |height: u64, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match h.block_by_height(height).await {
                Ok(block) => ok(block),
                Err(e) => err(e),
            })
        },
    );

    let faucet = warp::path!("faucet")
        .and(warp::post())
        .and(warp::body::json())
        .and(base.clone())
        .and_then(|req: FaucetRequest, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match h.faucet(req).await {
                Ok(resp) => ok(resp),
                Err(e) => err(e),
            })
        });

    let init_genesis = warp::path!("admin" / "init-genesis")
        .and(warp::post())
        .and(warp::body::json())
        .and(base)
        .and_then(|req: InitGenesisRequest, h: Arc<RpcHandler>| async move {
            Ok::<_, Rejection>(match h.init_genesis(&req.genesis, req.force).await {
                Ok(()) => ok(()),
                Err(e) => err(e),
            })
        });

    health
        .or(status)
        .or(submit_tx)
        .or(tx_receipt)
        .or(account_txs)
        .or(account_info)
        .or(latest_block)
        .or(block_by_height)
        .or(faucet)
        .or(init_genesis)
}

pub async fn serve(addr: std::net::SocketAddr, handler: Arc<RpcHandler>) {
    warp::serve(routes(handler)).run(addr).await;
}
