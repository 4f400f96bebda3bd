// Copyright (c) 2023-2025 The Catalyst Foundation

//! The Catalyst value transfer transaction.

use crate::codec::{
    put_bytes_vec, put_i64_le, put_u32_le, put_u64_le, put_u8, put_vec_count, to_hex32, CodecError,
};
use blake2::Blake2b512;
use digest::Digest;
use displaydoc::Display;

/// Leading magic of every wire image, ASCII `CTX1`.
pub const WIRE_MAGIC: &[u8; 4] = b"CTX1";

/// Domain separator prefixed to every signing payload, ASCII
/// `CATALYST_SIG_V1`.
pub const SIG_DOMAIN: &[u8; 15] = b"CATALYST_SIG_V1";

/// Maximum length of the free-form `data` field.
pub const MAX_TX_DATA_LEN: usize = 60;

/// Marker byte for a plain (non-confidential) entry amount.
const AMOUNT_PLAIN_TAG: u8 = 0x00;

/// An error which can occur when building or serializing a transaction.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum TxError {
    /// Transaction data is {0} bytes, the maximum is 60
    DataTooLong(usize),
    /// Transfer amount must be strictly positive
    AmountNonPositive,
    /// Signature is {0} bytes, expected 64
    SignatureLengthInvalid(usize),
    /// Codec: {0}
    Codec(CodecError),
}

impl From<CodecError> for TxError {
    fn from(src: CodecError) -> Self {
        Self::Codec(src)
    }
}

impl std::error::Error for TxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            _ => None,
        }
    }
}

/// The transaction type tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum TxType {
    /// A plain value transfer with visible amounts.
    NonConfidentialTransfer = 0x00,
}

/// A single balance change: `address` gains `amount` (negative for the
/// sender side).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// The account whose balance changes.
    pub address: [u8; 32],
    /// The signed balance delta.
    pub amount: i64,
}

/// The signed portion of a transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxCore {
    /// Transaction type tag.
    pub tx_type: TxType,
    /// Ordered balance changes.
    pub entries: Vec<Entry>,
    /// The sender's account nonce.
    pub nonce: u64,
    /// Earliest unix time (seconds) at which the transfer may apply.
    pub lock_time: u32,
    /// Fee paid to the network.
    pub fees: u64,
    /// Free-form data, at most [`MAX_TX_DATA_LEN`] bytes.
    pub data: Vec<u8>,
}

impl TxCore {
    /// Canonical serialization of the core.
    pub fn serialize(&self) -> Result<Vec<u8>, TxError> {
        if self.data.len() > MAX_TX_DATA_LEN {
            return Err(TxError::DataTooLong(self.data.len()));
        }

        let mut out = Vec::with_capacity(32 + self.entries.len() * 41 + self.data.len());
        put_u8(&mut out, self.tx_type as u8);
        put_vec_count(&mut out, self.entries.len())?;
        for entry in &self.entries {
            out.extend_from_slice(&entry.address);
            put_u8(&mut out, AMOUNT_PLAIN_TAG);
            put_i64_le(&mut out, entry.amount);
        }
        put_u64_le(&mut out, self.nonce);
        put_u32_le(&mut out, self.lock_time);
        put_u64_le(&mut out, self.fees);
        put_bytes_vec(&mut out, &self.data)?;
        Ok(out)
    }

    /// The exact byte string passed to the Schnorr signer.
    ///
    /// Unlike the wire image this binds the chain id and genesis hash, so a
    /// signature is only valid on the chain it was produced for.
    pub fn signing_payload(
        &self,
        chain_id: u64,
        genesis_hash: &[u8; 32],
        timestamp_ms: u64,
    ) -> Result<Vec<u8>, TxError> {
        let core = self.serialize()?;
        let mut out = Vec::with_capacity(SIG_DOMAIN.len() + 48 + core.len());
        out.extend_from_slice(SIG_DOMAIN);
        put_u64_le(&mut out, chain_id);
        out.extend_from_slice(genesis_hash);
        out.extend_from_slice(&core);
        put_u64_le(&mut out, timestamp_ms);
        Ok(out)
    }
}

/// A signed transaction envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tx {
    /// The signed core.
    pub core: TxCore,
    /// Schnorr signature over the signing payload.
    pub signature: [u8; 64],
    /// Submission wall-clock time in unix milliseconds.
    pub timestamp_ms: u64,
}

impl Tx {
    /// Assemble an envelope, validating the signature length.
    pub fn new(core: TxCore, signature: &[u8], timestamp_ms: u64) -> Result<Self, TxError> {
        let signature: [u8; 64] = signature
            .try_into()
            .map_err(|_| TxError::SignatureLengthInvalid(signature.len()))?;
        Ok(Self {
            core,
            signature,
            timestamp_ms,
        })
    }

    /// Canonical serialization of the envelope:
    /// `core || bytes_vec(signature) || u64_le(timestamp)`.
    pub fn serialize_envelope(&self) -> Result<Vec<u8>, TxError> {
        let mut out = self.core.serialize()?;
        put_bytes_vec(&mut out, &self.signature)?;
        put_u64_le(&mut out, self.timestamp_ms);
        Ok(out)
    }

    /// The bytes broadcast to the network: `WIRE_MAGIC || envelope`.
    pub fn wire_bytes(&self) -> Result<Vec<u8>, TxError> {
        let envelope = self.serialize_envelope()?;
        let mut out = Vec::with_capacity(WIRE_MAGIC.len() + envelope.len());
        out.extend_from_slice(WIRE_MAGIC);
        out.extend_from_slice(&envelope);
        Ok(out)
    }

    /// The transaction id, `Blake2b-512(wire)[0..32]`.
    pub fn id(&self) -> Result<[u8; 32], TxError> {
        let wire = self.wire_bytes()?;
        let digest: [u8; 64] = Blake2b512::digest(&wire).into();
        Ok(digest[..32].try_into().expect("split of fixed array"))
    }

    /// The transaction id in canonical hex form.
    pub fn id_hex(&self) -> Result<String, TxError> {
        Ok(to_hex32(&self.id()?))
    }
}

/// Build the core of a simple transfer: `amount` moves from `from` to `to`.
///
/// Self-transfers (`from == to`) are legal; the entries still appear in
/// sender-then-recipient order.
pub fn build_transfer(
    from: &[u8; 32],
    to: &[u8; 32],
    amount: i64,
    nonce: u64,
    fees: u64,
) -> Result<TxCore, TxError> {
    if amount <= 0 {
        return Err(TxError::AmountNonPositive);
    }
    Ok(TxCore {
        tx_type: TxType::NonConfidentialTransfer,
        entries: vec![
            Entry {
                address: *from,
                amount: -amount,
            },
            Entry {
                address: *to,
                amount,
            },
        ],
        nonce,
        lock_time: 0,
        fees,
        data: Vec::new(),
    })
}
