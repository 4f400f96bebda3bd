//! Chain-identity verification.
//!
//! An RPC endpoint is untrusted until it proves it serves the configured
//! chain: same chain id, network id and genesis hash. The verified flag is
//! advisory only; a send re-checks immediately before broadcasting.

use crate::{
    config::NetworkConfig,
    error::{Result, WalletError},
    rpc::RpcClient,
};

/// The expected identity of the network, with a verification flag.
pub struct ChainGuard {
    chain_id: u64,
    network_id: String,
    genesis_hash: String,
    verified: bool,
}

impl ChainGuard {
    /// Build a guard for the configured network.
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            network_id: config.network_id.to_ascii_lowercase(),
            genesis_hash: config.genesis_hash.to_ascii_lowercase(),
            verified: false,
        }
    }

    /// Whether the last verification succeeded. Advisory: callers must
    /// still verify before anything irreversible.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Check the endpoint's advertised identity against the configuration.
    ///
    /// Prefers the single `getSyncInfo` call; if the node does not support
    /// it, falls back to the three individual getters. Any divergence is a
    /// [`WalletError::ChainMismatch`] naming the offending field.
    pub async fn assert_chain_identity(&mut self, rpc: &mut RpcClient) -> Result<()> {
        self.verified = false;

        let (chain_id_str, network_id, genesis_hash) = match rpc.get_sync_info().await {
            Ok(info) => (info.chain_id, info.network_id, info.genesis_hash),
            Err(_) => {
                let chain_id = rpc.chain_id().await?;
                let network_id = rpc.network_id().await?;
                let genesis_hash = rpc.genesis_hash().await?;
                (chain_id, network_id, genesis_hash)
            }
        };

        let actual_chain_id = parse_chain_id(&chain_id_str)?;
        if actual_chain_id != self.chain_id {
            return Err(WalletError::ChainMismatch {
                field: "chain_id",
                expected: self.chain_id.to_string(),
                actual: format!("{actual_chain_id} ({chain_id_str})"),
            });
        }

        let actual_network_id = network_id.to_ascii_lowercase();
        if actual_network_id != self.network_id {
            return Err(WalletError::ChainMismatch {
                field: "network_id",
                expected: self.network_id.clone(),
                actual: actual_network_id,
            });
        }

        let actual_genesis = genesis_hash.to_ascii_lowercase();
        if actual_genesis != self.genesis_hash {
            return Err(WalletError::ChainMismatch {
                field: "genesis_hash",
                expected: self.genesis_hash.clone(),
                actual: actual_genesis,
            });
        }

        self.verified = true;
        Ok(())
    }
}

/// Parse a chain id from either `0x…` hex or decimal notation.
pub fn parse_chain_id(s: &str) -> Result<u64> {
    let lowered = s.trim().to_ascii_lowercase();
    let parsed = if let Some(digits) = lowered.strip_prefix("0x") {
        u64::from_str_radix(digits, 16)
    } else {
        lowered.parse::<u64>()
    };
    parsed.map_err(|_| WalletError::RpcResponse(format!("bad chain id: {s}")))
}
