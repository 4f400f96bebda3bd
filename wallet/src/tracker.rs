//! Submitted-transaction tracking.
//!
//! Every broadcast is recorded per sender address and polled until the
//! chain reports a terminal status. Records survive restarts through the
//! host key-value store, capped at the 50 most recent per address.

use crate::{
    error::{Result, WalletError},
    rpc::RpcClient,
    storage::{tracked_txs_key, KeyValueStore},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, time::Duration};
use tracing::debug;

/// How often pending transactions are polled while the wallet is unlocked.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Maximum tracked records kept per address.
pub const MAX_TRACKED_PER_ADDRESS: usize = 50;

/// Status of a freshly broadcast transaction.
pub const STATUS_PENDING: &str = "pending";
/// Terminal: the transfer is in the ledger.
pub const STATUS_APPLIED: &str = "applied";
/// Terminal: the transfer was discarded.
pub const STATUS_DROPPED: &str = "dropped";
/// The node does not know the transaction (yet).
pub const STATUS_NOT_FOUND: &str = "not_found";
/// Receipt polling hit a non-transient error; details in `last_receipt`.
pub const STATUS_ERROR: &str = "error";

/// One tracked transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTransaction {
    /// Locally computed id (hash of the signed wire bytes).
    pub local_id: String,
    /// Id returned by the broadcast endpoint, when it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Last observed status.
    pub status: String,
    /// Last receipt payload, or an error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_receipt: Option<Value>,
    /// When the transaction was broadcast, unix milliseconds.
    pub created_ms: u64,
    /// When the status was last refreshed, unix milliseconds.
    pub last_checked_ms: u64,
}

impl TrackedTransaction {
    /// Whether the chain has reached a final verdict.
    pub fn is_terminal(&self) -> bool {
        self.status == STATUS_APPLIED || self.status == STATUS_DROPPED
    }

    /// The id to poll receipts with: the server's if it returned one.
    pub fn poll_id(&self) -> &str {
        self.server_id.as_deref().unwrap_or(&self.local_id)
    }
}

/// Per-address tracked-transaction lists with write-through persistence.
pub struct TxTracker {
    network_id: String,
    entries: HashMap<String, Vec<TrackedTransaction>>,
}

impl TxTracker {
    /// Create a tracker for one network.
    pub fn new(network_id: &str) -> Self {
        Self {
            network_id: network_id.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Replace the in-memory list for `address` with the stored one.
    /// Called when an account becomes active.
    pub fn load(&mut self, store: &dyn KeyValueStore, address: &str) -> Result<()> {
        let key = tracked_txs_key(&self.network_id, address);
        let list = match store.load(&key)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Vec::new(),
        };
        self.entries.insert(address.to_string(), list);
        Ok(())
    }

    /// The tracked transactions for `address`, newest first.
    pub fn entries(&self, address: &str) -> &[TrackedTransaction] {
        self.entries.get(address).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record a fresh broadcast and persist the truncated list.
    pub fn track(
        &mut self,
        store: &dyn KeyValueStore,
        address: &str,
        local_id: &str,
        server_id: Option<String>,
        now_ms: u64,
    ) -> Result<()> {
        let list = self.entries.entry(address.to_string()).or_default();
        list.insert(
            0,
            TrackedTransaction {
                local_id: local_id.to_string(),
                server_id,
                status: STATUS_PENDING.to_string(),
                last_receipt: None,
                created_ms: now_ms,
                last_checked_ms: now_ms,
            },
        );
        list.truncate(MAX_TRACKED_PER_ADDRESS);
        self.persist(store, address)
    }

    /// One polling tick for `address`: at most one receipt call per
    /// non-terminal entry.
    ///
    /// Timeouts are transient and leave the entry for the next tick. Other
    /// failures mark the entry [`STATUS_ERROR`] with the message recorded
    /// in `last_receipt`. Returns the local ids that newly reached
    /// [`STATUS_APPLIED`].
    pub async fn poll_once(
        &mut self,
        rpc: &mut RpcClient,
        store: &dyn KeyValueStore,
        address: &str,
        now_ms: u64,
    ) -> Result<Vec<String>> {
        let mut applied = Vec::new();
        let mut changed = false;

        let Some(list) = self.entries.get_mut(address) else {
            return Ok(applied);
        };

        for entry in list.iter_mut() {
            if entry.is_terminal() {
                continue;
            }

            let receipt = match rpc.get_transaction_receipt(entry.poll_id()).await {
                Ok(receipt) => receipt,
                Err(WalletError::RpcTimeout) => {
                    debug!("receipt poll timed out for {}", entry.poll_id());
                    continue;
                }
                Err(e) => {
                    entry.status = STATUS_ERROR.to_string();
                    entry.last_receipt = Some(Value::String(e.to_string()));
                    entry.last_checked_ms = now_ms;
                    changed = true;
                    continue;
                }
            };

            let status = receipt
                .as_ref()
                .and_then(|r| r.get("status"))
                .and_then(|s| s.as_str())
                .unwrap_or(STATUS_NOT_FOUND)
                .to_string();

            if status == STATUS_APPLIED && entry.status != STATUS_APPLIED {
                applied.push(entry.local_id.clone());
            }
            if entry.status != status || entry.last_receipt != receipt {
                changed = true;
            }
            entry.status = status;
            entry.last_receipt = receipt;
            entry.last_checked_ms = now_ms;
        }

        if changed {
            self.persist(store, address)?;
        }
        Ok(applied)
    }

    fn persist(&self, store: &dyn KeyValueStore, address: &str) -> Result<()> {
        let key = tracked_txs_key(&self.network_id, address);
        let list = self.entries(address);
        store.store(&key, &serde_json::to_vec(list)?)
    }
}
