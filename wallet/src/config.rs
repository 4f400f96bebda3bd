//! Network configuration.
//!
//! The defaults below are concrete values for the public testnet, not
//! placeholders; a host overrides them to target another deployment.

use crate::error::Result;
use ctl_transaction_core::parse_hex32;
use serde::{Deserialize, Serialize};

/// Default network identifier.
pub const DEFAULT_NETWORK_ID: &str = "catalyst-testnet";

/// Default numeric chain id.
pub const DEFAULT_CHAIN_ID: u64 = 200_820_092;

/// Default genesis block hash.
pub const DEFAULT_GENESIS_HASH: &str =
    "0xeea103d8af772398862726fa068f383b8713fce42b5aba40578fb95e2f3fee5a";

/// Default RPC endpoints, in preference order.
pub const DEFAULT_RPC_URLS: [&str; 3] = [
    "https://rpc-eu.catalyst-testnet.network",
    "https://rpc-us.catalyst-testnet.network",
    "https://rpc-asia.catalyst-testnet.network",
];

/// Identity and endpoints of the network the wallet talks to.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Human-readable network identifier, compared case-insensitively.
    pub network_id: String,
    /// Numeric chain id.
    pub chain_id: u64,
    /// Genesis block hash in canonical hex form.
    pub genesis_hash: String,
    /// Ordered JSON-RPC endpoints; the first is preferred.
    pub rpc_urls: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            genesis_hash: DEFAULT_GENESIS_HASH.to_string(),
            rpc_urls: DEFAULT_RPC_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NetworkConfig {
    /// The genesis hash as raw bytes.
    pub fn genesis_hash_bytes(&self) -> Result<[u8; 32]> {
        Ok(parse_hex32(&self.genesis_hash)?)
    }
}
