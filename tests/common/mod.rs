//! Shared utilities for integration testing: a mock JSON-RPC node and a
//! relay bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{hex, keccak256, Address, B256, U256};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use eth_relay::blockchain::Wallet;
use eth_relay::config::RelayConfig;
use eth_relay::{HttpServer, RelayService, Shutdown};

/// Anvil's first development account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const WEI_PER_MILLI_ETH: u64 = 1_000_000_000_000_000;

/// `n` thousandths of an ETH, in wei.
pub fn milli_eth(n: u64) -> U256 {
    U256::from(n) * U256::from(WEI_PER_MILLI_ETH)
}

/// A transaction accepted by the mock node.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub hash: B256,
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub chain_id: Option<u64>,
}

/// Programmable chain state served by [`MockNode`].
#[derive(Debug)]
pub struct NodeState {
    pub chain_id: u64,
    pub block_number: u64,
    pub balance: U256,
    pub nonce: u64,
    pub gas_price: u128,
    /// Receipt queries answered with `null` before the receipt appears.
    pub pending_polls: usize,
    /// When set, broadcasts fail with this JSON-RPC error message.
    pub reject_broadcast: Option<String>,
    /// Reverted receipts (status 0x0) when true.
    pub revert: bool,
    pub sent: Vec<SentTx>,
    pub calls: Vec<String>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            chain_id: 1,
            block_number: 100,
            balance: milli_eth(1000),
            nonce: 7,
            gas_price: 1_000_000_000,
            pending_polls: 0,
            reject_broadcast: None,
            revert: false,
            sent: Vec::new(),
            calls: Vec::new(),
        }
    }
}

type SharedState = Arc<Mutex<NodeState>>;

/// In-process JSON-RPC node answering the handful of methods the relay uses.
pub struct MockNode {
    pub addr: SocketAddr,
    pub state: SharedState,
}

impl MockNode {
    pub async fn start(state: NodeState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new().route("/", post(rpc)).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|m| *m == method).count()
    }
}

async fn rpc(State(state): State<SharedState>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let mut node = state.lock().unwrap();
    node.calls.push(method.clone());

    let result = match method.as_str() {
        "eth_chainId" => Ok(json!(format!("{:#x}", node.chain_id))),
        "eth_blockNumber" => Ok(json!(format!("{:#x}", node.block_number))),
        "eth_getBalance" => Ok(json!(node.balance)),
        "eth_getTransactionCount" => Ok(json!(format!("{:#x}", node.nonce))),
        "eth_gasPrice" => Ok(json!(format!("{:#x}", node.gas_price))),
        "eth_sendRawTransaction" => broadcast(&mut node, &params),
        "eth_getTransactionReceipt" => Ok(receipt(&mut node, &params)),
        other => Err(format!("method {other} not supported")),
    };

    let body = match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    };
    Json(body)
}

fn broadcast(node: &mut NodeState, params: &Value) -> Result<Value, String> {
    if let Some(message) = &node.reject_broadcast {
        return Err(message.clone());
    }

    let raw = params[0].as_str().ok_or("missing raw transaction")?;
    let bytes = hex::decode(raw).map_err(|e| e.to_string())?;
    let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice()).map_err(|e| e.to_string())?;
    let hash = keccak256(&bytes);

    node.sent.push(SentTx {
        hash,
        to: envelope.to(),
        value: envelope.value(),
        nonce: envelope.nonce(),
        gas_limit: envelope.gas_limit(),
        chain_id: envelope.chain_id(),
    });
    node.nonce += 1;
    node.balance = node.balance.saturating_sub(envelope.value());

    Ok(json!(hash))
}

fn receipt(node: &mut NodeState, params: &Value) -> Value {
    let Some(hash) = params[0].as_str().and_then(|h| h.parse::<B256>().ok()) else {
        return Value::Null;
    };
    let Some(tx) = node.sent.iter().find(|tx| tx.hash == hash).cloned() else {
        return Value::Null;
    };
    if node.pending_polls > 0 {
        node.pending_polls -= 1;
        return Value::Null;
    }

    json!({
        "type": "0x0",
        "status": if node.revert { "0x0" } else { "0x1" },
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx.hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": format!("{:#x}", node.block_number),
        "gasUsed": "0x5208",
        "effectiveGasPrice": format!("{:#x}", node.gas_price),
        "from": TEST_ADDRESS,
        "to": tx.to,
        "contractAddress": null
    })
}

/// Relay configuration pointed at the given endpoints with fast polling.
pub fn test_config(rpc_urls: Vec<String>) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.blockchain.rpc_urls = rpc_urls;
    config.blockchain.rpc_timeout_secs = 2;
    config.blockchain.poll_interval_ms = 20;
    config.blockchain.confirmation_timeout_secs = 5;
    config
}

/// A relay running on an ephemeral port.
pub struct TestRelay {
    pub base_url: String,
    pub shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay with the given configuration, signing with the test key
/// when `with_wallet` is set.
pub async fn start_relay(config: RelayConfig, with_wallet: bool) -> TestRelay {
    let wallet = with_wallet
        .then(|| Wallet::from_private_key(TEST_PRIVATE_KEY, config.blockchain.chain_id).unwrap());
    let relay = RelayService::new(config, wallet).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(relay).run(listener, rx).await;
    });

    TestRelay {
        base_url: format!("http://{addr}"),
        shutdown,
    }
}
