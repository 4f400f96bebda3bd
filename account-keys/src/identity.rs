// Copyright (c) 2023-2025 The Catalyst Foundation

//! The root identity of a Catalyst wallet.
//!
//! All per-account private keys are derived from a single BIP-39 recovery
//! phrase plus an optional passphrase. The derivation chain is
//!
//! ```text
//! seed    = BIP39-seed(phrase, passphrase)                  (64 bytes)
//! master  = Blake2b-512(MASTER_TAG || seed)                 (64 bytes)
//! ikm_i   = Blake2b-512(ACCOUNT_TAG || master || u32_le(i)) (64 bytes)
//! privkey = ikm_i[0..32]
//! ```
//!
//! The domain tags keep the master and per-account hashes from ever
//! colliding with each other or with hashes used elsewhere in the protocol.

use crate::{
    domain_separators::{ACCOUNT_KEY_DOMAIN_TAG, MASTER_KEY_DOMAIN_TAG},
    error::Error,
};
use bip39::{Language, Mnemonic, MnemonicType, Seed};
use blake2::Blake2b512;
use ctl_crypto_keys::RistrettoPrivate;
use digest::Digest;
use zeroize::Zeroize;

/// Length in bytes of a BIP-39 seed.
pub const SEED_LENGTH: usize = 64;

/// A validated recovery phrase and passphrase, the root of all account keys.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct RootIdentity {
    phrase: String,
    passphrase: String,
}

impl RootIdentity {
    /// Construct a root identity from a recovery phrase and passphrase,
    /// validating the phrase against the English BIP-39 wordlist.
    pub fn new(phrase: &str, passphrase: &str) -> Result<Self, Error> {
        Mnemonic::from_phrase(phrase, Language::English)
            .map_err(|e| Error::BadMnemonic(e.to_string()))?;
        Ok(Self {
            phrase: phrase.to_string(),
            passphrase: passphrase.to_string(),
        })
    }

    /// Generate a fresh identity with a random 24-word phrase and no
    /// passphrase.
    pub fn generate() -> Self {
        let mnemonic = Mnemonic::new(MnemonicType::Words24, Language::English);
        Self {
            phrase: mnemonic.phrase().to_string(),
            passphrase: String::new(),
        }
    }

    /// The recovery phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// The passphrase (empty by default).
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// The 64-byte BIP-39 seed for this identity.
    pub fn seed(&self) -> [u8; SEED_LENGTH] {
        let mnemonic = Mnemonic::from_phrase(&self.phrase, Language::English)
            .expect("phrase was validated on construction");
        let seed = Seed::new(&mnemonic, &self.passphrase);
        seed.as_bytes()
            .try_into()
            .expect("BIP-39 seeds are 64 bytes")
    }

    /// The wallet master key material, `Blake2b-512(MASTER_TAG || seed)`.
    pub fn master_key_material(&self) -> [u8; 64] {
        let mut hasher = Blake2b512::new();
        hasher.update(MASTER_KEY_DOMAIN_TAG.as_bytes());
        hasher.update(self.seed());
        hasher.finalize().into()
    }

    /// The raw private key bytes for account `index`.
    pub fn account_private_key_bytes(&self, index: u32) -> [u8; 32] {
        let mut hasher = Blake2b512::new();
        hasher.update(ACCOUNT_KEY_DOMAIN_TAG.as_bytes());
        hasher.update(self.master_key_material());
        hasher.update(index.to_le_bytes());
        let ikm: [u8; 64] = hasher.finalize().into();
        ikm[..32].try_into().expect("split of fixed array")
    }

    /// The private key for account `index`.
    pub fn account_private_key(&self, index: u32) -> RistrettoPrivate {
        RistrettoPrivate::from_bytes(&self.account_private_key_bytes(index))
    }

    /// The canonical address for account `index`.
    pub fn account_address_hex(&self, index: u32) -> String {
        self.account_private_key(index)
            .public_key()
            .to_address_hex()
    }
}

/// Validate a recovery phrase without constructing an identity.
pub fn validate_mnemonic(phrase: &str) -> Result<(), Error> {
    Mnemonic::from_phrase(phrase, Language::English)
        .map(|_| ())
        .map_err(|e| Error::BadMnemonic(e.to_string()))
}
