// Copyright (c) 2023-2025 The Catalyst Foundation

#![deny(missing_docs)]

//! This crate defines the Catalyst account key derivation scheme.
//!
//! A wallet is rooted in a BIP-39 recovery phrase and an optional
//! passphrase. The 64-byte BIP-39 seed is expanded into master key material
//! with a domain-separated Blake2b-512 hash, and each account index then
//! yields an independent Ristretto255 private key from a second
//! domain-separated hash. Derivation is pure: the same phrase, passphrase
//! and index always produce the same key, with no randomness involved.

mod domain_separators;
mod error;
mod identity;

pub use crate::{
    domain_separators::{ACCOUNT_KEY_DOMAIN_TAG, MASTER_KEY_DOMAIN_TAG},
    error::Error,
    identity::{validate_mnemonic, RootIdentity, SEED_LENGTH},
};
