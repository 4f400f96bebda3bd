//! Catalyst Wallet Core
//!
//! The cryptographic and protocol core of a non-custodial wallet for the
//! Catalyst network.
//!
//! ## Security Model
//!
//! - Private keys never leave the wallet; signing happens locally
//! - Secrets at rest live in a password-encrypted vault
//! - RPC nodes are untrusted; their chain identity is verified before any
//!   broadcast
//! - The host supplies persistence (an opaque key-value store) and nothing
//!   else

pub mod chain;
pub mod config;
pub mod core;
pub mod error;
pub mod nonce;
pub mod rpc;
pub mod storage;
pub mod tracker;
pub mod vault;
pub mod wallet;

pub use crate::{
    chain::ChainGuard,
    config::NetworkConfig,
    core::{AccountStatus, SubmittedTransfer, WalletCore},
    error::{Result, WalletError},
    nonce::NonceAllocator,
    rpc::{CallOptions, RpcClient},
    storage::{FileStore, KeyValueStore, MemoryStore},
    tracker::{TrackedTransaction, TxTracker},
    vault::VaultRecord,
    wallet::{WalletAccount, WalletData, WalletKind},
};

/// Current wall-clock time in unix milliseconds.
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
