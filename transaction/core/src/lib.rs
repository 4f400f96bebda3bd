// Copyright (c) 2023-2025 The Catalyst Foundation

//! Catalyst transaction types and canonical serialization.
//!
//! The wire image of a transaction is fully specified down to the byte:
//! little-endian integers, count-prefixed vectors, and two ASCII domain
//! strings. The transaction id is the first 32 bytes of the Blake2b-512
//! hash of the wire image. The payload passed to the Schnorr signer is
//! distinct from the wire image: it additionally binds the chain id and
//! genesis hash, so a signed transfer cannot be replayed on another chain.

mod codec;
mod tx;

pub use crate::{
    codec::{lock_time_from_unix, parse_hex32, to_hex32, CodecError},
    tx::{
        build_transfer, Entry, Tx, TxCore, TxError, TxType, MAX_TX_DATA_LEN, SIG_DOMAIN,
        WIRE_MAGIC,
    },
};
