//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build plain value transfers from chain state (nonce, gas price)
//! - Sign and broadcast transactions
//! - Monitor confirmations
//!
//! Every step runs once; the first failure aborts the transfer.

use std::time::Duration;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, ConfirmedTransfer,
};
use crate::blockchain::wallet::Wallet;

/// Transaction builder for native value transfers.
pub struct TxBuilder<'a> {
    client: &'a BlockchainClient,
    wallet: &'a Wallet,
}

impl<'a> TxBuilder<'a> {
    /// Create a new transaction builder.
    pub fn new(client: &'a BlockchainClient, wallet: &'a Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build an unsigned value transfer from the current chain state.
    ///
    /// # Arguments
    /// * `to` - Destination address
    /// * `value` - Amount of native token to send, in wei
    pub async fn build(&self, to: Address, value: U256) -> BlockchainResult<TransactionRequest> {
        let nonce = self.client.get_pending_nonce(self.wallet.address()).await?;
        let gas_price = self.client.get_gas_price().await?;

        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(value)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(self.client.config().gas_limit);

        tracing::debug!(
            to = %to,
            value = %value,
            nonce = nonce,
            gas_price = gas_price,
            "Built transfer transaction"
        );

        Ok(tx)
    }

    /// Build, sign, broadcast and wait for confirmation of a value transfer.
    pub async fn send_value(&self, to: Address, value: U256) -> BlockchainResult<ConfirmedTransfer> {
        let tx = self.build(to, value).await?;
        let envelope = self.wallet.sign_transaction(tx).await?;
        let tx_hash = self.client.send_raw_transaction(&envelope.encoded_2718()).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            from = %self.wallet.address(),
            to = %to,
            value = %value,
            "Transaction broadcast"
        );

        let (block_number, gas_used) = self.wait_for_confirmation(tx_hash).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            block_number = block_number,
            gas_used = gas_used,
            "Transaction confirmed"
        );

        Ok(ConfirmedTransfer {
            tx_hash,
            from: self.wallet.address(),
            to,
            value,
            block_number,
            gas_used,
        })
    }

    /// Wait for a transaction to reach the configured confirmation depth.
    ///
    /// Returns the inclusion block number and the gas consumed.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<(u64, u64)> {
        let timeout_secs = self.client.config().confirmation_timeout_secs;

        match timeout(Duration::from_secs(timeout_secs), self.poll_receipt(tx_hash)).await {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout {
                tx_hash,
                secs: timeout_secs,
            }),
        }
    }

    async fn poll_receipt(&self, tx_hash: TxHash) -> BlockchainResult<(u64, u64)> {
        let required = self.client.config().confirmation_blocks;
        let mut ticker = interval(Duration::from_millis(self.client.config().poll_interval_ms));

        loop {
            ticker.tick().await;

            let receipt = self.client.get_transaction_receipt(tx_hash).await?;
            let current_block = match &receipt {
                Some(_) => self.client.get_block_number().await?,
                None => 0,
            };

            match confirmation_status(receipt.as_ref(), current_block, required)? {
                ConfirmationStatus::Confirmed { block_number, gas_used } => {
                    return Ok((block_number, gas_used));
                }
                ConfirmationStatus::Pending => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                ConfirmationStatus::Confirming { current, required } => {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        confirmations = current,
                        required = required,
                        "Waiting for confirmations"
                    );
                }
            }
        }
    }
}

/// Classify a receipt against the current chain head.
///
/// The inclusion block counts as the first confirmation.
pub fn confirmation_status(
    receipt: Option<&TransactionReceipt>,
    current_block: u64,
    required: u64,
) -> BlockchainResult<ConfirmationStatus> {
    let receipt = match receipt {
        Some(r) => r,
        None => return Ok(ConfirmationStatus::Pending),
    };

    if !receipt.status() {
        return Err(BlockchainError::Reverted(receipt.transaction_hash));
    }

    let tx_block = match receipt.block_number {
        Some(block) => block,
        None => return Ok(ConfirmationStatus::Pending),
    };
    let confirmations = current_block.saturating_sub(tx_block) + 1;

    if confirmations >= required {
        Ok(ConfirmationStatus::Confirmed {
            block_number: tx_block,
            gas_used: receipt.gas_used,
        })
    } else {
        Ok(ConfirmationStatus::Confirming {
            current: confirmations,
            required,
        })
    }
}
