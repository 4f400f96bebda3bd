// Copyright (c) 2023-2025 The Catalyst Foundation

//! Strict hex parsing and fixed-width little-endian encoding.
//!
//! These helpers never normalize invalid input; anything out of shape is an
//! error, so nothing malformed can reach the signer.

use displaydoc::Display;

/// An error from strict hex parsing or integer encoding.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum CodecError {
    /// The value is not a 0x-prefixed hex string
    HexFormat,
    /// Expected 64 hex characters after the prefix, found {0}
    Hex32Shape(usize),
    /// Integer value out of range for the target encoding width
    EncodeRange,
}

impl std::error::Error for CodecError {}

/// Parse a `0x`-prefixed 32-byte hex string.
///
/// Input is lowercased before validation, so `0X` and uppercase digits are
/// accepted; the canonical form emitted by [`to_hex32`] is always lowercase.
pub fn parse_hex32(s: &str) -> Result<[u8; 32], CodecError> {
    let lowered = s.to_ascii_lowercase();
    let digits = lowered.strip_prefix("0x").ok_or(CodecError::HexFormat)?;
    if digits.len() != 64 {
        return Err(CodecError::Hex32Shape(digits.len()));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(digits, &mut out).map_err(|_| CodecError::HexFormat)?;
    Ok(out)
}

/// Render 32 bytes in the canonical lowercase `0x` form.
pub fn to_hex32(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Convert a unix timestamp in seconds to a `lock_time` field.
///
/// Values beyond `u32::MAX` (the year 2106) are an encoding error, not a
/// clamp.
pub fn lock_time_from_unix(secs: u64) -> Result<u32, CodecError> {
    u32::try_from(secs).map_err(|_| CodecError::EncodeRange)
}

pub(crate) fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

pub(crate) fn put_u32_le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_u64_le(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_i64_le(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Write a count-prefixed vector header: `u32_le(count)`.
pub(crate) fn put_vec_count(out: &mut Vec<u8>, count: usize) -> Result<(), CodecError> {
    let count = u32::try_from(count).map_err(|_| CodecError::EncodeRange)?;
    put_u32_le(out, count);
    Ok(())
}

/// Write a length-prefixed byte string: `u32_le(len) || bytes`.
pub(crate) fn put_bytes_vec(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), CodecError> {
    put_vec_count(out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}
