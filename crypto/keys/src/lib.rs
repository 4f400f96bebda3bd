// Copyright (c) 2023-2025 The Catalyst Foundation

//! Catalyst key types.
//!
//! A Catalyst account is controlled by a single Ristretto255 private scalar.
//! The account's on-chain address is the compressed form of the corresponding
//! public point, `x * G`, rendered as a lowercase `0x`-prefixed hex string.
//!
//! This crate also implements the domain-separated Schnorr signature scheme
//! used to authorize transfers. Key material is zeroized on drop.

mod error;
mod ristretto;
mod schnorr;

pub use crate::{
    error::KeyError,
    ristretto::{RistrettoPrivate, RistrettoPublic},
    schnorr::{sign, sign_with_rng, verify, RistrettoSignature, SIGNATURE_LENGTH},
};
