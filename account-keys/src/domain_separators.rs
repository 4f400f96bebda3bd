// Copyright (c) 2023-2025 The Catalyst Foundation

/// Domain separator for hashing a BIP-39 seed into wallet master key
/// material.
pub const MASTER_KEY_DOMAIN_TAG: &str = "CATALYST_WALLET_V1_MASTER";

/// Domain separator for hashing master key material and an account index
/// into per-account private key bytes.
pub const ACCOUNT_KEY_DOMAIN_TAG: &str = "CATALYST_WALLET_V1_ACCOUNT";
