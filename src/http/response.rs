//! Error → HTTP response mapping.
//!
//! Every failure uses the `{"error": <message>}` envelope. Insufficient
//! funds also echo the wallet balance in ETH.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::blockchain::units::eth_f64;
use crate::relay::RelayError;

impl RelayError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_)
            | RelayError::InvalidDestination(_)
            | RelayError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            RelayError::SignerUnavailable | RelayError::Blockchain(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        } else {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = match &self {
            RelayError::InsufficientFunds { message, balance } => json!({
                "error": message,
                "balance": eth_f64(*balance),
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
