//! The relay service: signer, lazily bootstrapped provider and the transfer
//! flow shared by every transfer route.

use alloy::primitives::U256;
use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::blockchain::units::{eth_f64, format_eth, format_eth_fixed};
use crate::blockchain::{BlockchainClient, BlockchainResult, ConfirmedTransfer, TxBuilder, Wallet};
use crate::config::{RelayConfig, ValidationError};
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::types::{
    transferable_amount, BalanceResponse, StatusResponse, TransferPolicy, TransferRequest,
    SERVICE_METHOD,
};

/// Shared state behind every handler.
///
/// The provider connection is created on first use (or by an explicit
/// [`RelayService::bootstrap`]) and kept for the process lifetime. A failed
/// bootstrap leaves it unset so the next caller retries.
pub struct RelayService {
    config: RelayConfig,
    policy: TransferPolicy,
    wallet: Option<Wallet>,
    client: OnceCell<BlockchainClient>,
    transfer_lock: Mutex<()>,
}

impl RelayService {
    /// Create the service. `wallet` is `None` when no key is configured; the
    /// read-only endpoints still work in that case.
    pub fn new(config: RelayConfig, wallet: Option<Wallet>) -> Result<Self, ValidationError> {
        let policy = TransferPolicy::from_config(&config.transfer)?;

        if let Some(wallet) = &wallet {
            if wallet.chain_id() != config.blockchain.chain_id {
                tracing::warn!(
                    wallet_chain_id = wallet.chain_id(),
                    configured_chain_id = config.blockchain.chain_id,
                    "Wallet chain ID differs from configuration"
                );
            }
        }

        Ok(Self {
            config,
            policy,
            wallet,
            client: OnceCell::new(),
            transfer_lock: Mutex::new(()),
        })
    }

    /// Connect to the first reachable endpoint if not already connected.
    ///
    /// Returns whether a provider connection is available afterwards.
    pub async fn bootstrap(&self) -> bool {
        match self.client().await {
            Ok(client) => {
                tracing::info!(
                    rpc_url = %client.rpc_url(),
                    wallet = ?self.wallet.as_ref().map(Wallet::address),
                    "Relay bootstrap complete"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Relay bootstrap failed");
                false
            }
        }
    }

    /// The bound provider connection, bootstrapping it on first use.
    pub async fn client(&self) -> BlockchainResult<&BlockchainClient> {
        self.client
            .get_or_try_init(|| BlockchainClient::connect(self.config.blockchain.clone()))
            .await
    }

    /// The configured signer, if any.
    pub fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Send `min(requested, balance - reserve)` to the requested destination
    /// and wait for confirmation.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<ConfirmedTransfer, RelayError> {
        let result = self.execute_transfer(request).await;
        match &result {
            Ok(_) => metrics::record_transfer("success"),
            Err(e) => metrics::record_transfer(e.outcome()),
        }
        result
    }

    async fn execute_transfer(&self, request: &TransferRequest) -> Result<ConfirmedTransfer, RelayError> {
        let to = request.destination(self.policy.treasury)?;
        let requested = request.requested_amount(self.policy.default_amount);

        let wallet = self.wallet.as_ref().ok_or(RelayError::SignerUnavailable)?;
        let client = self.client().await?;

        let _guard = self.transfer_guard().await;

        let balance = client.get_balance(wallet.address()).await?;
        if balance < self.policy.reserve {
            return Err(RelayError::InsufficientFunds {
                message: self.policy.reserve_message(),
                balance,
            });
        }

        let amount = transferable_amount(requested, balance, self.policy.reserve).ok_or_else(|| {
            RelayError::InsufficientFunds {
                message: format!(
                    "Insufficient balance: {} ETH available after {} ETH gas reserve",
                    format_eth(balance - self.policy.reserve),
                    format_eth(self.policy.reserve)
                ),
                balance,
            }
        })?;

        tracing::info!(
            from = %wallet.address(),
            to = %to,
            requested_eth = eth_f64(requested),
            amount_eth = eth_f64(amount),
            balance_eth = eth_f64(balance),
            "Submitting transfer"
        );

        let transfer = TxBuilder::new(client, wallet).send_value(to, amount).await?;
        Ok(transfer)
    }

    /// Hold the per-signer lock for the rest of a transfer, so the balance
    /// read, nonce fetch and broadcast of concurrent transfers do not
    /// interleave. `None` when `transfer.serialize_transfers` is off.
    async fn transfer_guard(&self) -> Option<MutexGuard<'_, ()>> {
        if self.config.transfer.serialize_transfers {
            Some(self.transfer_lock.lock().await)
        } else {
            None
        }
    }

    /// Signer address, balance and treasury.
    pub async fn balance(&self) -> Result<BalanceResponse, RelayError> {
        let wallet = self.wallet.as_ref().ok_or(RelayError::SignerUnavailable)?;
        let client = self.client().await?;
        let balance = client.get_balance(wallet.address()).await?;

        Ok(BalanceResponse {
            wallet: wallet.address().to_string(),
            balance: format_eth(balance),
            treasury: self.policy.treasury.to_string(),
        })
    }

    /// Service identity and balance. Read failures report a zero balance.
    pub async fn status(&self) -> StatusResponse {
        let balance = match &self.wallet {
            Some(wallet) => match self.client().await {
                Ok(client) => client.get_balance(wallet.address()).await.unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Balance read failed, reporting zero");
                    U256::ZERO
                }),
                Err(e) => {
                    tracing::debug!(error = %e, "Provider unavailable, reporting zero balance");
                    U256::ZERO
                }
            },
            None => U256::ZERO,
        };

        StatusResponse {
            status: "online".to_string(),
            method: SERVICE_METHOD.to_string(),
            wallet: self.wallet.as_ref().map(|w| w.address().to_string()),
            balance: format_eth_fixed(balance),
        }
    }
}
