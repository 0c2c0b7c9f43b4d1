//! Transfer request parsing, transfer policy and response payloads.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::units::{eth_f64, format_eth, parse_eth, parse_eth_amount};
use crate::blockchain::ConfirmedTransfer;
use crate::config::{TransferConfig, ValidationError};
use crate::relay::error::RelayError;

/// Identifier reported by `GET /status`.
pub const SERVICE_METHOD: &str = "direct_wallet_transfer";

/// Body accepted by the transfer routes. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRequest {
    /// Amount in ETH, number or numeric string.
    #[serde(default)]
    pub amount: Option<Value>,

    /// Alias for `amount`.
    #[serde(default, rename = "amountETH")]
    pub amount_eth: Option<Value>,

    /// Destination address.
    #[serde(default)]
    pub to: Option<String>,

    /// Alias for `to`.
    #[serde(default, rename = "toAddress")]
    pub to_address: Option<String>,

    /// Alias for `to`.
    #[serde(default)]
    pub treasury: Option<String>,
}

impl TransferRequest {
    /// Decode a request body. An empty body is an empty request.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| RelayError::InvalidRequest(e.to_string()))
    }

    /// Requested amount in wei.
    ///
    /// Missing, zero or unparseable amounts fall back to `default`. Numbers
    /// may use exponent notation. A negative amount, or a positive one below
    /// one wei, yields zero, which the transfer rejects as insufficient.
    pub fn requested_amount(&self, default: U256) -> U256 {
        let text = [&self.amount, &self.amount_eth]
            .into_iter()
            .flatten()
            .find_map(amount_text);

        let text = match text {
            Some(t) => t,
            None => return default,
        };

        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(magnitude) => (true, magnitude),
            None => (false, text.as_str()),
        };

        let amount = match parse_eth_amount(magnitude) {
            Some(amount) => amount,
            None => return default,
        };

        if amount.is_zero() {
            return if has_nonzero_digit(magnitude) { U256::ZERO } else { default };
        }
        if negative {
            U256::ZERO
        } else {
            amount
        }
    }

    /// Destination address, falling back to `treasury`.
    pub fn destination(&self, treasury: Address) -> Result<Address, RelayError> {
        let raw = [&self.to, &self.to_address, &self.treasury]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty());

        match raw {
            Some(raw) => raw
                .parse()
                .map_err(|_| RelayError::InvalidDestination(raw.to_string())),
            None => Ok(treasury),
        }
    }
}

fn amount_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn has_nonzero_digit(amount: &str) -> bool {
    amount
        .split(['e', 'E'])
        .next()
        .unwrap_or_default()
        .bytes()
        .any(|b| (b'1'..=b'9').contains(&b))
}

/// Validated transfer policy derived from [`TransferConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPolicy {
    pub treasury: Address,
    pub default_amount: U256,
    pub reserve: U256,
}

impl TransferPolicy {
    pub fn from_config(config: &TransferConfig) -> Result<Self, ValidationError> {
        let treasury = config.treasury_address.parse().map_err(|_| ValidationError {
            field: "transfer.treasury_address",
            message: format!("'{}' is not an address", config.treasury_address),
        })?;
        let default_amount = parse_eth(&config.default_amount_eth)
            .filter(|a| !a.is_zero())
            .ok_or_else(|| ValidationError {
                field: "transfer.default_amount_eth",
                message: "must be a positive ETH amount".to_string(),
            })?;
        let reserve = parse_eth(&config.reserve_eth).ok_or_else(|| ValidationError {
            field: "transfer.reserve_eth",
            message: "must be an ETH amount".to_string(),
        })?;

        Ok(Self {
            treasury,
            default_amount,
            reserve,
        })
    }

    /// Error message for a balance below the gas reserve.
    pub fn reserve_message(&self) -> String {
        format!("Need {} ETH for gas", format_eth(self.reserve))
    }
}

/// Amount that can actually be sent: `min(requested, balance - reserve)`.
///
/// `None` when nothing positive remains.
pub fn transferable_amount(requested: U256, balance: U256, reserve: U256) -> Option<U256> {
    let available = balance.checked_sub(reserve)?;
    let amount = requested.min(available);
    (!amount.is_zero()).then_some(amount)
}

/// Success payload of the transfer routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferResponse {
    pub success: bool,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    pub hash: String,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
}

impl From<ConfirmedTransfer> for TransferResponse {
    fn from(transfer: ConfirmedTransfer) -> Self {
        let hash = transfer.tx_hash.to_string();
        Self {
            success: true,
            tx_hash: hash.clone(),
            hash: hash.clone(),
            transaction_hash: hash,
            from: transfer.from.to_string(),
            to: transfer.to.to_string(),
            amount: eth_f64(transfer.value),
            block_number: transfer.block_number,
            gas_used: transfer.gas_used.to_string(),
        }
    }
}

/// Payload of `GET /balance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub wallet: String,
    pub balance: String,
    pub treasury: String,
}

/// Payload of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub method: String,
    pub wallet: Option<String>,
    pub balance: String,
}
