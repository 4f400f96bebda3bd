// Copyright (c) 2023-2025 The Catalyst Foundation

//! Errors which can occur when handling keys and signatures.

use displaydoc::Display;

/// An error which can occur when handling keys and signatures.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum KeyError {
    /// The length of the given data does not match, provided {0}, expected {1}
    LengthMismatch(usize, usize),
    /// The provided bytes are not a valid Ristretto point encoding
    InvalidPoint,
    /// The signature bytes could not be parsed
    SignatureMalformed,
    /// The signature does not verify for this key and message
    SignatureRejected,
}

impl std::error::Error for KeyError {}
