// Copyright (c) 2023-2025 The Catalyst Foundation

//! Schnorr signatures over Ristretto255.
//!
//! The challenge hash binds the signer's public key in addition to the
//! nonce commitment and the message, `e = H(R || P || m)`, which rules out
//! key-substitution attacks. The hash is Blake2b-256 and its output is
//! interpreted as a little-endian integer reduced mod the group order.

use crate::{
    error::KeyError,
    ristretto::{RistrettoPrivate, RistrettoPublic},
};
use blake2::Blake2b;
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use digest::{consts::U32, Digest};
use rand_core::{CryptoRng, OsRng, RngCore};

type Blake2b256 = Blake2b<U32>;

/// Length of a serialized signature, `R (32) || s (32)`.
pub const SIGNATURE_LENGTH: usize = 64;

/// A Schnorr signature: the compressed nonce commitment `R` followed by the
/// response scalar `s`, both 32 bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RistrettoSignature([u8; SIGNATURE_LENGTH]);

impl RistrettoSignature {
    /// The serialized signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0
    }

    /// The compressed nonce commitment `R`.
    pub fn r_bytes(&self) -> [u8; 32] {
        self.0[..32].try_into().expect("split of fixed array")
    }

    /// The response scalar bytes `s`.
    pub fn s_bytes(&self) -> [u8; 32] {
        self.0[32..].try_into().expect("split of fixed array")
    }
}

impl AsRef<[u8]> for RistrettoSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for RistrettoSignature {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for RistrettoSignature {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] = src
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(src.len(), SIGNATURE_LENGTH))?;
        Ok(Self(bytes))
    }
}

/// Sign `message` with `private`, sampling the nonce from the OS RNG.
pub fn sign(private: &RistrettoPrivate, message: &[u8]) -> RistrettoSignature {
    sign_with_rng(&mut OsRng, private, message)
}

/// Sign `message` with `private`, sampling the nonce from `rng`.
///
/// The nonce is 32 uniform bytes reduced mod the group order; it must never
/// repeat for two different messages under the same key.
pub fn sign_with_rng<T: RngCore + CryptoRng>(
    rng: &mut T,
    private: &RistrettoPrivate,
    message: &[u8],
) -> RistrettoSignature {
    let x = private.as_ref();
    let p_bytes = private.public_key().to_bytes();

    let mut k_bytes = [0u8; 32];
    rng.fill_bytes(&mut k_bytes);
    let k = Scalar::from_bytes_mod_order(k_bytes);

    let r_bytes = RistrettoPoint::mul_base(&k).compress().to_bytes();
    let e = challenge(&r_bytes, &p_bytes, message);
    let s = k + e * x;

    let mut out = [0u8; SIGNATURE_LENGTH];
    out[..32].copy_from_slice(&r_bytes);
    out[32..].copy_from_slice(&s.to_bytes());
    RistrettoSignature(out)
}

/// Verify `signature` over `message` for `public`.
pub fn verify(
    public: &RistrettoPublic,
    message: &[u8],
    signature: &RistrettoSignature,
) -> Result<(), KeyError> {
    let r_bytes = signature.r_bytes();
    let r_point = CompressedRistretto(r_bytes)
        .decompress()
        .ok_or(KeyError::SignatureMalformed)?;
    let s = Option::<Scalar>::from(Scalar::from_canonical_bytes(signature.s_bytes()))
        .ok_or(KeyError::SignatureMalformed)?;

    let e = challenge(&r_bytes, &public.to_bytes(), message);
    if RistrettoPoint::mul_base(&s) == r_point + e * public.as_ref() {
        Ok(())
    } else {
        Err(KeyError::SignatureRejected)
    }
}

fn challenge(r_bytes: &[u8; 32], p_bytes: &[u8; 32], message: &[u8]) -> Scalar {
    let mut hasher = Blake2b256::new();
    hasher.update(r_bytes);
    hasher.update(p_bytes);
    hasher.update(message);
    let digest: [u8; 32] = hasher.finalize().into();
    Scalar::from_bytes_mod_order(digest)
}
