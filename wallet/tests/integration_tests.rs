//! Integration tests for catalyst-wallet
//!
//! These tests run the core against local canned JSON-RPC nodes:
//! - endpoint failover and error classification
//! - chain-identity verification before any broadcast
//! - the full send path including the insufficient-funds guard and the
//!   nonce-race retry
//! - receipt tracking transitions

use catalyst_wallet::{
    config::DEFAULT_GENESIS_HASH, rpc::CallOptions, storage::MemoryStore, tracker, NetworkConfig,
    RpcClient, WalletCore, WalletError,
};
use serde_json::{json, Value};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PASSWORD: &str = "integration-test-password";

// ============================================================================
// Canned JSON-RPC node
// ============================================================================

/// What a canned node answers to one request.
enum Reply {
    /// A JSON-RPC `result`.
    Result(Value),
    /// A JSON-RPC `error` object.
    Error(i64, &'static str),
    /// A raw HTTP status with an empty body.
    HttpStatus(u16),
    /// Never answer; the client's timeout fires.
    Hang,
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

struct MockNode {
    url: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    fn methods_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn was_called(&self, method: &str) -> bool {
        self.methods_called().iter().any(|m| m == method)
    }
}

async fn spawn_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let handler: Arc<Handler> = Arc::new(handler);

    let accept_calls = calls.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let handler = handler.clone();
            let calls = accept_calls.clone();
            tokio::spawn(async move {
                serve_connection(stream, handler, calls).await;
            });
        }
    });

    MockNode {
        url: format!("http://{addr}"),
        calls,
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<String>>>,
) {
    // reqwest reuses connections, so keep answering on the same socket.
    while let Some(body) = read_request(&mut stream).await {
        let request: Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => return,
        };
        let method = request["method"].as_str().unwrap_or("").to_string();
        let id = request["id"].clone();
        calls.lock().unwrap().push(method.clone());

        match handler(&method, &request["params"]) {
            Reply::Result(result) => {
                let body = json!({"jsonrpc": "2.0", "result": result, "id": id});
                if write_json(&mut stream, 200, &body).await.is_err() {
                    return;
                }
            }
            Reply::Error(code, message) => {
                let body = json!({
                    "jsonrpc": "2.0",
                    "error": {"code": code, "message": message},
                    "id": id,
                });
                if write_json(&mut stream, 200, &body).await.is_err() {
                    return;
                }
            }
            Reply::HttpStatus(status) => {
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-length: 0\r\n\r\n"
                );
                if stream.write_all(response.as_bytes()).await.is_err() {
                    return;
                }
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                return;
            }
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())?;

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn write_json(
    stream: &mut TcpStream,
    status: u16,
    body: &Value,
) -> std::io::Result<()> {
    let payload = serde_json::to_vec(body).unwrap();
    let head = format!(
        "HTTP/1.1 {status} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
        payload.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&payload).await
}

/// A sync-info reply matching the default network config, with mixed case
/// to exercise normalization.
fn good_sync_info() -> Value {
    json!({
        "chain_id": "0xbf84c7c",
        "network_id": "Catalyst-Testnet",
        "genesis_hash": DEFAULT_GENESIS_HASH.to_uppercase().replace("0X", "0x"),
    })
}

fn config_for(nodes: &[&MockNode]) -> NetworkConfig {
    NetworkConfig {
        rpc_urls: nodes.iter().map(|n| n.url.clone()).collect(),
        ..NetworkConfig::default()
    }
}

// ============================================================================
// RPC failover
// ============================================================================

mod rpc_failover {
    use super::*;

    #[tokio::test]
    async fn retryable_errors_rotate_to_the_next_endpoint() {
        let bad = spawn_node(|_, _| Reply::HttpStatus(500)).await;
        let good = spawn_node(|_, _| Reply::Result(json!("42"))).await;

        let mut rpc = RpcClient::new(vec![bad.url.clone(), good.url.clone()]);
        let result = rpc
            .call("catalyst_chainId", json!([]), CallOptions::default())
            .await
            .unwrap();

        assert_eq!(result, json!("42"));
        assert_eq!(rpc.last_good(), 1);

        // Subsequent calls start from the endpoint that answered.
        rpc.call("catalyst_chainId", json!([]), CallOptions::default())
            .await
            .unwrap();
        assert_eq!(bad.methods_called().len(), 1);
        assert_eq!(good.methods_called().len(), 2);
    }

    #[tokio::test]
    async fn http_429_and_408_also_rotate() {
        for status in [429u16, 408] {
            let throttled = spawn_node(move |_, _| Reply::HttpStatus(status)).await;
            let good = spawn_node(|_, _| Reply::Result(json!("1"))).await;

            let mut rpc = RpcClient::new(vec![throttled.url.clone(), good.url.clone()]);
            rpc.call("catalyst_networkId", json!([]), CallOptions::default())
                .await
                .unwrap();
            assert_eq!(rpc.last_good(), 1);
        }
    }

    #[tokio::test]
    async fn client_errors_do_not_rotate() {
        let bad = spawn_node(|_, _| Reply::HttpStatus(404)).await;
        let good = spawn_node(|_, _| Reply::Result(json!("1"))).await;

        let mut rpc = RpcClient::new(vec![bad.url.clone(), good.url.clone()]);
        let error = rpc
            .call("catalyst_chainId", json!([]), CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(error, WalletError::RpcHttp(404)));
        assert!(good.methods_called().is_empty());
    }

    #[tokio::test]
    async fn protocol_errors_do_not_rotate() {
        let erroring = spawn_node(|_, _| Reply::Error(-32601, "method not found")).await;
        let good = spawn_node(|_, _| Reply::Result(json!("1"))).await;

        let mut rpc = RpcClient::new(vec![erroring.url.clone(), good.url.clone()]);
        let error = rpc
            .call("catalyst_foo", json!([]), CallOptions::default())
            .await
            .unwrap_err();

        match error {
            WalletError::RpcProtocol { code, message } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "method not found");
            }
            other => panic!("expected RpcProtocol, got {other}"),
        }
        assert!(good.methods_called().is_empty());
    }

    #[tokio::test]
    async fn timeouts_rotate_to_the_next_endpoint() {
        let hanging = spawn_node(|_, _| Reply::Hang).await;
        let good = spawn_node(|_, _| Reply::Result(json!("7"))).await;

        let mut rpc = RpcClient::new(vec![hanging.url.clone(), good.url.clone()]);
        let result = rpc
            .call(
                "catalyst_chainId",
                json!([]),
                CallOptions::with_timeout(Duration::from_millis(250)),
            )
            .await
            .unwrap();

        assert_eq!(result, json!("7"));
        assert_eq!(rpc.last_good(), 1);
    }

    #[tokio::test]
    async fn failover_can_be_disabled() {
        let bad = spawn_node(|_, _| Reply::HttpStatus(503)).await;
        let good = spawn_node(|_, _| Reply::Result(json!("1"))).await;

        let mut rpc = RpcClient::new(vec![bad.url.clone(), good.url.clone()]);
        let options = CallOptions {
            allow_failover: false,
            ..CallOptions::default()
        };
        let error = rpc
            .call("catalyst_chainId", json!([]), options)
            .await
            .unwrap_err();

        assert!(matches!(error, WalletError::RpcHttp(503)));
        assert!(good.methods_called().is_empty());
    }

    #[tokio::test]
    async fn all_endpoints_failing_raises_the_last_error() {
        let bad1 = spawn_node(|_, _| Reply::HttpStatus(500)).await;
        let bad2 = spawn_node(|_, _| Reply::HttpStatus(502)).await;

        let mut rpc = RpcClient::new(vec![bad1.url.clone(), bad2.url.clone()]);
        let error = rpc
            .call("catalyst_chainId", json!([]), CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error, WalletError::RpcHttp(502)));
    }
}

// ============================================================================
// Chain-identity guard
// ============================================================================

mod chain_identity {
    use super::*;

    #[tokio::test]
    async fn matching_identity_verifies() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn falls_back_to_individual_getters() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getSyncInfo" => Reply::Error(-32601, "method not found"),
            "catalyst_chainId" => Reply::Result(json!("200820092")),
            "catalyst_networkId" => Reply::Result(json!("catalyst-testnet")),
            "catalyst_genesisHash" => Reply::Result(json!(DEFAULT_GENESIS_HASH)),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_chain_id_is_a_mismatch() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(json!({
                "chain_id": "0x01",
                "network_id": "catalyst-testnet",
                "genesis_hash": DEFAULT_GENESIS_HASH,
            })),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        match core.verify_chain().await.unwrap_err() {
            WalletError::ChainMismatch { field, .. } => assert_eq!(field, "chain_id"),
            other => panic!("expected ChainMismatch, got {other}"),
        }
    }

    #[tokio::test]
    async fn send_on_mismatched_chain_never_broadcasts() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(json!({
                "chain_id": "0x01",
                "network_id": "catalyst-testnet",
                "genesis_hash": DEFAULT_GENESIS_HASH,
            })),
            _ => Reply::Result(json!("0")),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let error = core.send_transfer(&to, 7).await.unwrap_err();
        assert!(matches!(error, WalletError::ChainMismatch { .. }));
        assert!(!node.was_called("catalyst_sendRawTransaction"));
    }
}

// ============================================================================
// Send path
// ============================================================================

mod send_path {
    use super::*;

    /// A node simulating a small working chain: fixed balance, committed
    /// nonce 4, fee 3, accepting broadcasts.
    fn working_chain(balance: &'static str) -> impl Fn(&str, &Value) -> Reply {
        move |method, params| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            "catalyst_getBalance" => Reply::Result(json!(balance)),
            "catalyst_getNonce" => Reply::Result(json!(4)),
            "catalyst_estimateFee" => Reply::Result(json!("3")),
            "catalyst_sendRawTransaction" => {
                let wire_hex = params[0].as_str().unwrap();
                assert!(wire_hex.starts_with("0x43545831"), "missing CTX1 magic");
                Reply::Result(json!("0xserver-id"))
            }
            "catalyst_getTransactionsByAddress" => Reply::Result(json!([])),
            _ => Reply::Error(-32601, "method not found"),
        }
    }

    #[tokio::test]
    async fn happy_path_signs_broadcasts_and_tracks() {
        let node = spawn_node(working_chain("1000000")).await;
        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let submitted = core.send_transfer(&to, 200).await.unwrap();

        assert_eq!(submitted.nonce, 5); // committed 4 + 1
        assert_eq!(submitted.fee, 3);
        assert_eq!(submitted.server_id, "0xserver-id");
        assert!(submitted.local_id.starts_with("0x"));
        assert_eq!(submitted.local_id.len(), 66);

        let tracked = core.tracked_transactions().unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].status, tracker::STATUS_PENDING);
        assert_eq!(tracked[0].server_id.as_deref(), Some("0xserver-id"));
    }

    #[tokio::test]
    async fn consecutive_sends_use_increasing_nonces() {
        let node = spawn_node(working_chain("1000000")).await;
        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let first = core.send_transfer(&to, 10).await.unwrap();
        let second = core.send_transfer(&to, 10).await.unwrap();
        let third = core.send_transfer(&to, 10).await.unwrap();

        // The committed nonce is only read once; later sends count up
        // locally even though the chain still reports 4.
        assert_eq!(first.nonce, 5);
        assert_eq!(second.nonce, 6);
        assert_eq!(third.nonce, 7);
    }

    #[tokio::test]
    async fn insufficient_funds_guard_blocks_broadcast() {
        let node = spawn_node(working_chain("100")).await;
        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        match core.send_transfer(&to, 200).await.unwrap_err() {
            WalletError::InsufficientFunds { have, need } => {
                assert_eq!(have, 100);
                assert_eq!(need, 205);
            }
            other => panic!("expected InsufficientFunds, got {other}"),
        }
        assert!(!node.was_called("catalyst_sendRawTransaction"));
    }

    #[tokio::test]
    async fn self_transfer_only_needs_the_fee() {
        let node = spawn_node(working_chain("3")).await;
        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        // Balance 3 covers exactly the fee; sending 200 to ourselves works.
        let own = core.wallet().unwrap().selected_account().address.clone();
        let submitted = core.send_transfer(&own, 200).await.unwrap();
        assert_eq!(submitted.fee, 3);
        assert!(node.was_called("catalyst_sendRawTransaction"));
    }

    #[tokio::test]
    async fn nonce_race_retries_once_with_a_fresh_floor() {
        // The chain rejects the first broadcast on nonce grounds and then
        // reports a higher committed nonce, as if another wallet process
        // just spent nonce 5.
        let broadcasts = Arc::new(Mutex::new(0u32));
        let handler_broadcasts = broadcasts.clone();

        let node = spawn_node(move |method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            "catalyst_getBalance" => Reply::Result(json!("1000000")),
            "catalyst_estimateFee" => Reply::Result(json!("3")),
            "catalyst_getNonce" => {
                let raced = *handler_broadcasts.lock().unwrap() > 0;
                Reply::Result(json!(if raced { 5 } else { 4 }))
            }
            "catalyst_sendRawTransaction" => {
                let mut count = handler_broadcasts.lock().unwrap();
                *count += 1;
                if *count == 1 {
                    Reply::Error(-32000, "nonce too low")
                } else {
                    Reply::Result(json!("0xretried"))
                }
            }
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let submitted = core.send_transfer(&to, 10).await.unwrap();

        assert_eq!(*broadcasts.lock().unwrap(), 2);
        assert_eq!(submitted.server_id, "0xretried");
        // First attempt used 5; the refreshed floor moved past the race.
        assert_eq!(submitted.nonce, 6);
    }

    #[tokio::test]
    async fn persistent_nonce_rejection_surfaces_nonce_race() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            "catalyst_getBalance" => Reply::Result(json!("1000000")),
            "catalyst_estimateFee" => Reply::Result(json!("3")),
            "catalyst_getNonce" => Reply::Result(json!(4)),
            "catalyst_sendRawTransaction" => Reply::Error(-32000, "bad nonce for sender"),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let error = core.send_transfer(&to, 10).await.unwrap_err();
        assert!(matches!(error, WalletError::NonceRace));
    }

    #[tokio::test]
    async fn send_requires_an_unlocked_wallet() {
        let node = spawn_node(working_chain("1000000")).await;
        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());

        let to = format!("0x{}", "02".repeat(32));
        let error = core.send_transfer(&to, 10).await.unwrap_err();
        assert!(matches!(error, WalletError::WalletLocked));
        assert!(node.methods_called().is_empty());
    }
}

// ============================================================================
// Receipt tracking
// ============================================================================

mod receipts {
    use super::*;

    #[tokio::test]
    async fn poll_transitions_to_applied_and_refreshes() {
        let applied = Arc::new(Mutex::new(false));
        let handler_applied = applied.clone();

        let node = spawn_node(move |method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            "catalyst_getBalance" => Reply::Result(json!("1000000")),
            "catalyst_getNonce" => Reply::Result(json!(4)),
            "catalyst_estimateFee" => Reply::Result(json!("3")),
            "catalyst_sendRawTransaction" => Reply::Result(json!("0xserver-id")),
            "catalyst_getTransactionReceipt" => {
                if *handler_applied.lock().unwrap() {
                    Reply::Result(json!({"status": "applied", "cycle": 12}))
                } else {
                    Reply::Result(Value::Null)
                }
            }
            "catalyst_getTransactionsByAddress" => Reply::Result(json!([])),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        let submitted = core.send_transfer(&to, 10).await.unwrap();

        // While the chain has no receipt, the entry stays non-terminal.
        let newly_applied = core.poll_receipts().await.unwrap();
        assert!(newly_applied.is_empty());
        assert_eq!(
            core.tracked_transactions().unwrap()[0].status,
            tracker::STATUS_NOT_FOUND
        );

        // The receipt appears: one more tick reports the transition and
        // triggers balance/history refreshes.
        *applied.lock().unwrap() = true;
        let newly_applied = core.poll_receipts().await.unwrap();
        assert_eq!(newly_applied, vec![submitted.local_id.clone()]);
        assert_eq!(
            core.tracked_transactions().unwrap()[0].status,
            tracker::STATUS_APPLIED
        );
        assert!(node.was_called("catalyst_getTransactionsByAddress"));

        // Terminal entries are not polled again.
        let receipt_calls_before = node
            .methods_called()
            .iter()
            .filter(|m| *m == "catalyst_getTransactionReceipt")
            .count();
        core.poll_receipts().await.unwrap();
        let receipt_calls_after = node
            .methods_called()
            .iter()
            .filter(|m| *m == "catalyst_getTransactionReceipt")
            .count();
        assert_eq!(receipt_calls_before, receipt_calls_after);
    }

    #[tokio::test]
    async fn protocol_errors_mark_the_entry() {
        let node = spawn_node(move |method, _| match method {
            "catalyst_getSyncInfo" => Reply::Result(good_sync_info()),
            "catalyst_getBalance" => Reply::Result(json!("1000000")),
            "catalyst_getNonce" => Reply::Result(json!(4)),
            "catalyst_estimateFee" => Reply::Result(json!("3")),
            "catalyst_sendRawTransaction" => Reply::Result(json!("0xserver-id")),
            "catalyst_getTransactionReceipt" => Reply::Error(-32000, "node exploded"),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let to = format!("0x{}", "02".repeat(32));
        core.send_transfer(&to, 10).await.unwrap();

        core.poll_receipts().await.unwrap();
        let entry = &core.tracked_transactions().unwrap()[0];
        assert_eq!(entry.status, tracker::STATUS_ERROR);
        let recorded = entry.last_receipt.as_ref().unwrap().as_str().unwrap();
        assert!(recorded.contains("node exploded"));
    }
}

// ============================================================================
// History caching
// ============================================================================

mod history {
    use super::*;

    #[tokio::test]
    async fn history_is_fetched_and_cached() {
        let node = spawn_node(|method, _| match method {
            "catalyst_getTransactionsByAddress" => Reply::Result(json!([
                {"id": "0x01", "amount": "7"},
                {"id": "0x02", "amount": "9"},
            ])),
            _ => Reply::Error(-32601, "method not found"),
        })
        .await;

        let mut core = WalletCore::new(config_for(&[&node]), MemoryStore::new());
        core.create_wallet_from_mnemonic("Main", TEST_PHRASE, "", 1, PASSWORD)
            .unwrap();

        let fetched = core.fetch_history(10).await.unwrap();
        assert_eq!(fetched.len(), 2);

        let cached = core.cached_history().unwrap();
        assert_eq!(cached, fetched);
    }
}
