//! Router and request handlers.
//!
//! Single-operation endpoints surface the error kind through the status
//! code. Batch endpoints always answer 200 with per-item `ok` flags;
//! partial failure is not a top-level error.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::auth::basic_auth;
use crate::config::ServerConfig;
use crate::token::BatchDispatcher;
use crate::types::{
    BatchResponse, MintBatchRequest, MintRequest, OperationOutcome, OperationRequest,
    WhitelistBatchRequest, WhitelistRequest,
};

pub struct AppState {
    pub dispatcher: Arc<BatchDispatcher>,
    pub auth_user: String,
    pub auth_pass: String,
}

impl AppState {
    pub fn new(dispatcher: Arc<BatchDispatcher>, server: &ServerConfig) -> Self {
        Self {
            dispatcher,
            auth_user: server.auth_user.clone(),
            auth_pass: server.auth_pass.clone(),
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/whitelist", post(whitelist))
        .route("/whitelist/multiple", post(whitelist_multiple))
        .route("/mint", post(mint))
        .route("/mint/multiple", post(mint_multiple))
        .layer(middleware::from_fn_with_state(state.clone(), basic_auth));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn whitelist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WhitelistRequest>,
) -> Response {
    info!("endpoint: whitelist");
    let outcome = state.dispatcher.dispatch_one(req.into()).await;
    single_response(outcome)
}

async fn mint(State(state): State<Arc<AppState>>, Json(req): Json<MintRequest>) -> Response {
    info!("endpoint: mint");
    let outcome = state.dispatcher.dispatch_one(req.into()).await;
    single_response(outcome)
}

async fn whitelist_multiple(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WhitelistBatchRequest>,
) -> Json<BatchResponse> {
    info!(items = req.addresses.len(), "endpoint: whitelist multiple");
    let requests: Vec<OperationRequest> =
        req.addresses.into_iter().map(OperationRequest::from).collect();
    let transactions = state.dispatcher.dispatch_batch(requests).await;
    Json(BatchResponse { transactions })
}

async fn mint_multiple(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MintBatchRequest>,
) -> Json<BatchResponse> {
    info!(items = req.mints.len(), "endpoint: mint multiple");
    let requests: Vec<OperationRequest> =
        req.mints.into_iter().map(OperationRequest::from).collect();
    let transactions = state.dispatcher.dispatch_batch(requests).await;
    Json(BatchResponse { transactions })
}

fn single_response(outcome: OperationOutcome) -> Response {
    let status = match outcome.error.as_deref() {
        // Included but reverted is structurally a success: the caller gets
        // the hash and the ok flag.
        None | Some("reverted") => StatusCode::OK,
        Some("validation") => StatusCode::BAD_REQUEST,
        Some("estimation") => StatusCode::UNPROCESSABLE_ENTITY,
        Some(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(outcome)).into_response()
}
