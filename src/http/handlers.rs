//! Route handlers.
//!
//! `/convert` and its aliases all share [`transfer`].

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

use crate::http::server::AppState;
use crate::relay::{BalanceResponse, RelayError, StatusResponse, TransferRequest, TransferResponse};

/// Paths served by the transfer handler.
pub const TRANSFER_ROUTES: [&str; 5] = [
    "/convert",
    "/send-eth",
    "/withdraw",
    "/transfer",
    "/coinbase-withdraw",
];

/// POST transfer: send ETH from the relay wallet and wait for confirmation.
pub async fn transfer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TransferResponse>, RelayError> {
    let request = TransferRequest::from_body(&body)?;
    let transfer = state.relay.transfer(&request).await?;
    Ok(Json(TransferResponse::from(transfer)))
}

pub async fn balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, RelayError> {
    Ok(Json(state.relay.balance().await?))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.relay.status().await)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
