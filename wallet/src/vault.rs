//! Encrypted secret storage.
//!
//! The vault is a password-encrypted blob holding the serialized wallet:
//! scrypt for password-based key derivation and XChaCha20-Poly1305 for
//! authenticated encryption. KDF parameters are stored in the record, so
//! they can be raised later without breaking vaults already on disk.

use crate::error::{Result, WalletError};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use serde::{Deserialize, Serialize};

/// Current vault record version.
pub const VAULT_VERSION: u32 = 1;

/// KDF name recorded in the vault.
pub const KDF_NAME: &str = "scrypt";

/// Cipher name recorded in the vault.
pub const CIPHER_NAME: &str = "xchacha20-poly1305";

// scrypt cost parameters: N = 2^15, r = 8, p = 1, 32-byte key.
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_N: u32 = 1 << SCRYPT_LOG_N;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 32;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;

/// Key derivation parameters stored alongside the ciphertext.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    /// KDF algorithm name, always `scrypt`.
    pub name: String,
    /// CPU/memory cost (the actual value, not its log).
    #[serde(rename = "N")]
    pub n: u32,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
    /// 16-byte salt, canonical hex.
    #[serde(rename = "saltHex")]
    pub salt_hex: String,
}

/// Cipher parameters stored alongside the ciphertext.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CipherParams {
    /// AEAD algorithm name, always `xchacha20-poly1305`.
    pub name: String,
    /// 24-byte nonce, canonical hex.
    #[serde(rename = "nonceHex")]
    pub nonce_hex: String,
}

/// An encrypted vault record, serialized as JSON for storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Record format version.
    pub version: u32,
    /// Key derivation parameters.
    pub kdf: KdfParams,
    /// Cipher parameters.
    pub cipher: CipherParams,
    /// AEAD ciphertext (plaintext plus tag), canonical hex.
    #[serde(rename = "ciphertextHex")]
    pub ciphertext_hex: String,
}

impl VaultRecord {
    /// Encrypt `plaintext` under `password` with a fresh salt and nonce.
    pub fn create(password: &str, plaintext: &[u8]) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(password, &salt, SCRYPT_N, SCRYPT_R, SCRYPT_P)?;

        let cipher = XChaCha20Poly1305::new_from_slice(&key)
            .map_err(|_| WalletError::VaultAlgUnsupported("bad key length".into()))?;
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| WalletError::VaultAuthFailed)?;

        Ok(Self {
            version: VAULT_VERSION,
            kdf: KdfParams {
                name: KDF_NAME.to_string(),
                n: SCRYPT_N,
                r: SCRYPT_R,
                p: SCRYPT_P,
                salt_hex: format!("0x{}", hex::encode(salt)),
            },
            cipher: CipherParams {
                name: CIPHER_NAME.to_string(),
                nonce_hex: format!("0x{}", hex::encode(nonce)),
            },
            ciphertext_hex: format!("0x{}", hex::encode(ciphertext)),
        })
    }

    /// Decrypt the record with `password`.
    ///
    /// A wrong password and a tampered record fail identically with
    /// [`WalletError::VaultAuthFailed`].
    pub fn open(&self, password: &str) -> Result<Vec<u8>> {
        if self.version != VAULT_VERSION {
            return Err(WalletError::VaultVersionUnsupported(self.version));
        }
        if self.kdf.name != KDF_NAME {
            return Err(WalletError::VaultAlgUnsupported(self.kdf.name.clone()));
        }
        if self.cipher.name != CIPHER_NAME {
            return Err(WalletError::VaultAlgUnsupported(self.cipher.name.clone()));
        }

        let salt = decode_hex_field(&self.kdf.salt_hex, SALT_LEN)?;
        let nonce = decode_hex_field(&self.cipher.nonce_hex, NONCE_LEN)?;
        let ciphertext = hex_bytes(&self.ciphertext_hex)?;

        // Re-derive with the parameters in the record, not the current
        // defaults.
        let key = derive_key(password, &salt, self.kdf.n, self.kdf.r, self.kdf.p)?;

        let cipher = XChaCha20Poly1305::new_from_slice(&key)
            .map_err(|_| WalletError::VaultAlgUnsupported("bad key length".into()))?;
        cipher
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| WalletError::VaultAuthFailed)
    }

    /// Re-encrypt the vault contents under a new password.
    pub fn change_password(&self, old_password: &str, new_password: &str) -> Result<Self> {
        let plaintext = self.open(old_password)?;
        Self::create(new_password, &plaintext)
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a stored record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn derive_key(password: &str, salt: &[u8], n: u32, r: u32, p: u32) -> Result<[u8; KEY_LEN]> {
    if n < 2 || !n.is_power_of_two() {
        return Err(WalletError::VaultAlgUnsupported(format!(
            "scrypt N={n} is not a power of two"
        )));
    }
    let log_n = n.trailing_zeros() as u8;
    let params = Params::new(log_n, r, p, KEY_LEN)
        .map_err(|e| WalletError::VaultAlgUnsupported(format!("scrypt params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt, &params, &mut key)
        .map_err(|e| WalletError::VaultAlgUnsupported(format!("scrypt: {e}")))?;
    Ok(key)
}

fn decode_hex_field(field: &str, expected_len: usize) -> Result<Vec<u8>> {
    let bytes = hex_bytes(field)?;
    if bytes.len() != expected_len {
        return Err(WalletError::VaultAlgUnsupported(format!(
            "expected {expected_len}-byte field, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn hex_bytes(field: &str) -> Result<Vec<u8>> {
    let digits = field
        .strip_prefix("0x")
        .ok_or(WalletError::Codec(ctl_transaction_core::CodecError::HexFormat))?;
    hex::decode(digits)
        .map_err(|_| WalletError::Codec(ctl_transaction_core::CodecError::HexFormat))
}
