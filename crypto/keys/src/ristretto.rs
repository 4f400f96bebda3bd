// Copyright (c) 2023-2025 The Catalyst Foundation

//! Ristretto255 private and public keys.

use crate::error::KeyError;
use core::fmt;
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// A Ristretto255 private key.
///
/// Constructed from 32 bytes interpreted as a little-endian integer and
/// reduced modulo the group order, so any 32-byte string is a valid input.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct RistrettoPrivate(Scalar);

impl RistrettoPrivate {
    /// Interpret 32 bytes as a little-endian scalar, reduced mod the group
    /// order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(Scalar::from_bytes_mod_order(*bytes))
    }

    /// Generate a private key from a cryptographically secure RNG.
    pub fn from_random<T: RngCore + CryptoRng>(rng: &mut T) -> Self {
        Self(Scalar::random(rng))
    }

    /// The canonical (reduced) scalar bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// The public key for this private key.
    pub fn public_key(&self) -> RistrettoPublic {
        RistrettoPublic::from(self)
    }
}

impl AsRef<Scalar> for RistrettoPrivate {
    fn as_ref(&self) -> &Scalar {
        &self.0
    }
}

impl From<Scalar> for RistrettoPrivate {
    fn from(scalar: Scalar) -> Self {
        Self(scalar)
    }
}

impl TryFrom<&[u8]> for RistrettoPrivate {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = src
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(src.len(), 32))?;
        Ok(Self::from_bytes(&bytes))
    }
}

// Private keys deliberately have no Debug or Display implementation; the
// scalar must not end up in logs.
impl PartialEq for RistrettoPrivate {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes().ct_eq(&other.0.to_bytes()).into()
    }
}

impl Eq for RistrettoPrivate {}

/// A Ristretto255 public key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RistrettoPublic(RistrettoPoint);

impl RistrettoPublic {
    /// The compressed point bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// The canonical address form, lowercase `0x` + 64 hex characters.
    pub fn to_address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl From<&RistrettoPrivate> for RistrettoPublic {
    fn from(private: &RistrettoPrivate) -> Self {
        Self(RistrettoPoint::mul_base(&private.0))
    }
}

impl From<RistrettoPoint> for RistrettoPublic {
    fn from(point: RistrettoPoint) -> Self {
        Self(point)
    }
}

impl AsRef<RistrettoPoint> for RistrettoPublic {
    fn as_ref(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl TryFrom<&[u8]> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let compressed = CompressedRistretto::from_slice(src)
            .map_err(|_| KeyError::LengthMismatch(src.len(), 32))?;
        let point = compressed.decompress().ok_or(KeyError::InvalidPoint)?;
        Ok(Self(point))
    }
}

impl fmt::Display for RistrettoPublic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_address_hex())
    }
}
