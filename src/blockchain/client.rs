//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Probe the candidate JSON-RPC endpoints in order and bind the first live one
//! - Query chain state (block number, balances, nonces, receipts)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

/// Blockchain RPC client bound to a single live endpoint.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Provider for the selected endpoint.
    provider: Arc<dyn Provider + Send + Sync>,
    /// URL of the selected endpoint.
    rpc_url: String,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Probe `config.rpc_urls` in order and bind the first endpoint that
    /// answers a block number query.
    ///
    /// Per-endpoint failures are logged and skipped. When every candidate
    /// fails the result is [`BlockchainError::NoEndpointReachable`].
    pub async fn connect(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut last_error = String::from("no endpoints configured");

        for (idx, rpc_url) in config.rpc_urls.iter().enumerate() {
            match Self::probe(rpc_url, timeout_duration).await {
                Ok((provider, block_number)) => {
                    metrics::record_rpc_health(rpc_url, true);

                    let client = Self {
                        provider,
                        rpc_url: rpc_url.clone(),
                        config: config.clone(),
                        timeout_duration,
                    };

                    // Don't fail initialization - allow graceful degradation
                    if let Err(e) = client.verify_chain_id().await {
                        tracing::warn!(rpc_url = %rpc_url, error = %e, "Chain verification failed");
                    }

                    tracing::info!(
                        rpc_url = %rpc_url,
                        chain_id = config.chain_id,
                        block_number = block_number,
                        "Blockchain client connected"
                    );
                    return Ok(client);
                }
                Err(e) => {
                    metrics::record_rpc_health(rpc_url, false);
                    tracing::warn!(
                        provider_idx = idx,
                        rpc_url = %rpc_url,
                        error = %e,
                        "RPC endpoint unavailable, trying next candidate"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(BlockchainError::NoEndpointReachable {
            tried: config.rpc_urls.len(),
            last_error,
        })
    }

    /// Build a provider for one endpoint and run the liveness check.
    async fn probe(
        rpc_url: &str,
        timeout_duration: Duration,
    ) -> BlockchainResult<(Arc<dyn Provider + Send + Sync>, u64)> {
        let url: url::Url = rpc_url.parse().map_err(|e: url::ParseError| {
            BlockchainError::InvalidEndpoint {
                url: rpc_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        let block_number = match timeout(timeout_duration, provider.get_block_number()).await {
            Ok(Ok(block_number)) => block_number,
            Ok(Err(e)) => return Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => return Err(BlockchainError::Timeout(timeout_duration.as_secs())),
        };

        Ok((provider, block_number))
    }

    /// Run one RPC call under the configured timeout.
    async fn call<T, F>(&self, op: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(rpc_url = %self.rpc_url, op = op, error = %e, "RPC error");
                Err(BlockchainError::Rpc(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(rpc_url = %self.rpc_url, op = op, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.call("eth_chainId", self.provider.get_chain_id()).await.map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number()).await
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address)).await
    }

    /// Get the pending-inclusive transaction count (nonce) for an address.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        let fut = self
            .provider
            .get_transaction_count(address)
            .block_id(BlockId::Number(BlockNumberOrTag::Pending));
        self.call("eth_getTransactionCount", fut).await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.call("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", self.provider.get_transaction_receipt(tx_hash))
            .await
    }

    /// Broadcast an EIP-2718 encoded signed transaction.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self
            .call("eth_sendRawTransaction", self.provider.send_raw_transaction(encoded))
            .await?;
        Ok(*pending.tx_hash())
    }

    /// URL of the endpoint this client is bound to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
