// Copyright (c) 2023-2025 The Catalyst Foundation

//! Errors which can occur during account key derivation.

use displaydoc::Display;

/// An error which can occur during account key derivation.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// Invalid BIP-39 mnemonic phrase: {0}
    BadMnemonic(String),
}

impl std::error::Error for Error {}
