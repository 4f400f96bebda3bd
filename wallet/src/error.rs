//! Wallet error types.
//!
//! Every failure mode of the core maps to exactly one of these kinds, so
//! hosts can match on them without parsing message strings.

use ctl_crypto_keys::KeyError;
use ctl_transaction_core::{CodecError, TxError};
use thiserror::Error;

/// Convenience alias used throughout the wallet crate.
pub type Result<T> = std::result::Result<T, WalletError>;

/// An error from the wallet core.
#[derive(Debug, Error)]
pub enum WalletError {
    /// A key parsing or signature failure.
    #[error("key: {0}")]
    Key(#[from] KeyError),

    /// A strict hex or integer codec failure.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// A transaction construction or serialization failure.
    #[error("transaction: {0}")]
    Tx(#[from] TxError),

    /// The recovery phrase failed BIP-39 validation.
    #[error("invalid mnemonic: {0}")]
    BadMnemonic(String),

    /// The vault record has an unsupported version.
    #[error("unsupported vault version {0}")]
    VaultVersionUnsupported(u32),

    /// The vault record names an unsupported KDF or cipher.
    #[error("unsupported vault algorithm: {0}")]
    VaultAlgUnsupported(String),

    /// Decryption failed; wrong password and tampered ciphertext are
    /// indistinguishable.
    #[error("vault authentication failed")]
    VaultAuthFailed,

    /// The referenced account id does not exist in this wallet.
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    /// The operation is not available for this wallet kind.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// The stored payload is neither a v2 wallet nor a known legacy shape.
    #[error("unrecognized wallet payload")]
    UnknownPayload,

    /// No wallet session; unlock first.
    #[error("wallet is locked")]
    WalletLocked,

    /// The RPC endpoint answered with a non-success HTTP status.
    #[error("rpc http status {0}")]
    RpcHttp(u16),

    /// The RPC request exceeded its deadline and was aborted.
    #[error("rpc request timed out")]
    RpcTimeout,

    /// The RPC endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    RpcProtocol {
        /// JSON-RPC error code.
        code: i64,
        /// Server-provided message.
        message: String,
    },

    /// No HTTP response was received (connect/read failure).
    #[error("rpc transport: {0}")]
    RpcTransport(String),

    /// Every configured endpoint failed.
    #[error("all rpc endpoints failed: {0}")]
    RpcUnreachable(String),

    /// The endpoint answered 200 but the body was not a JSON-RPC response
    /// of the expected shape.
    #[error("malformed rpc response: {0}")]
    RpcResponse(String),

    /// The endpoint is serving a different chain than configured.
    #[error("chain identity mismatch on {field}: expected {expected}, got {actual}")]
    ChainMismatch {
        /// Which identity field diverged.
        field: &'static str,
        /// The configured value.
        expected: String,
        /// What the endpoint reported.
        actual: String,
    },

    /// The sender cannot cover amount plus fees.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Current balance.
        have: u128,
        /// Amount plus estimated fees.
        need: u128,
    },

    /// The broadcast was rejected on nonce grounds; another submission won
    /// the race. The nonce floor has been refreshed, retry if desired.
    #[error("nonce already used; refresh and retry")]
    NonceRace,

    /// The host persistence layer failed.
    #[error("storage: {0}")]
    Storage(String),

    /// A JSON (de)serialization failure in a stored payload.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ctl_account_keys::Error> for WalletError {
    fn from(src: ctl_account_keys::Error) -> Self {
        match src {
            ctl_account_keys::Error::BadMnemonic(msg) => Self::BadMnemonic(msg),
        }
    }
}
