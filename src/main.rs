//! Ethereum transfer relay.
//!
//! Accepts a small JSON request on any of the transfer routes, sends
//! `min(requested, balance - reserve)` ETH from the configured signer and
//! answers once the transaction is confirmed.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http (router, middleware) ──▶ relay (policy, transfer flow)
//!                                                  │
//!                                                  ▼
//!                                  blockchain (wallet, client, tx builder)
//!                                                  │
//!                                                  ▼
//!                                      JSON-RPC endpoint (first reachable)
//!
//!     Cross-cutting: config, observability (logging, metrics), lifecycle
//! ```

use std::process::ExitCode;

use tokio::net::TcpListener;

use eth_relay::blockchain::Wallet;
use eth_relay::config::load_from_env;
use eth_relay::observability::{logging, metrics};
use eth_relay::{HttpServer, RelayService, Shutdown};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("eth-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        chain_id = config.blockchain.chain_id,
        rpc_endpoints = config.blockchain.rpc_urls.len(),
        treasury = %config.transfer.treasury_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let wallet = match Wallet::from_env(config.blockchain.chain_id) {
        Ok(wallet) => {
            tracing::info!(address = %wallet.address(), "Wallet loaded");
            Some(wallet)
        }
        Err(e) => {
            tracing::warn!(error = %e, "No usable signer, transfers are disabled");
            None
        }
    };

    let bind_address = config.listener.bind_address.clone();
    let relay = RelayService::new(config, wallet)?;

    // A failed bootstrap is retried on the first request
    relay.bootstrap().await;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(relay);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
