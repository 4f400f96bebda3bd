//! The wallet data model.
//!
//! A wallet is either rooted in a recovery phrase (and can grow accounts)
//! or wraps a single imported private key. The serialized form is version 2;
//! the legacy single-key payload from early releases is migrated on parse.

use crate::error::{Result, WalletError};
use ctl_account_keys::RootIdentity;
use ctl_crypto_keys::RistrettoPrivate;
use ctl_transaction_core::parse_hex32;
use serde::{Deserialize, Serialize};

/// Serialized wallet format version.
pub const WALLET_VERSION: u32 = 2;

/// One account of a wallet.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    /// Stable opaque identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Canonical address, lowercase `0x` + 64 hex.
    pub address: String,
    /// Derivation index; present iff the account is mnemonic-derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_index: Option<u32>,
    /// Creation time, unix milliseconds.
    pub created_at_ms: u64,
}

/// What kind of secret the wallet is rooted in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletKind {
    /// Derived from a BIP-39 recovery phrase; can add accounts.
    #[serde(rename_all = "camelCase")]
    MnemonicV1 {
        /// The recovery phrase.
        mnemonic: String,
        /// Optional BIP-39 passphrase (empty by default).
        passphrase: String,
        /// The next unused derivation index; increases monotonically.
        next_account_index: u32,
    },
    /// A single imported private key.
    #[serde(rename_all = "camelCase")]
    PrivateKeyV1 {
        /// The imported key, as provided.
        private_key_hex: String,
    },
}

/// A deserialized wallet (version 2).
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    /// Always [`WALLET_VERSION`].
    pub version: u32,
    /// Wallet display name.
    pub name: String,
    /// Creation time, unix milliseconds.
    pub created_at_ms: u64,
    /// Ordered, non-empty account list.
    pub accounts: Vec<WalletAccount>,
    /// Id of the currently selected account; always present in `accounts`.
    pub selected_account_id: String,
    /// The wallet's root secret.
    #[serde(flatten)]
    pub kind: WalletKind,
}

fn account_id_for(address: &str) -> String {
    // Addresses are canonical 0x + 64 hex, so a prefix of the address is a
    // stable, collision-free id.
    format!("acct-{}", &address[2..18])
}

impl WalletData {
    /// Create a wallet from a recovery phrase, deriving accounts
    /// `0..initial_accounts` and selecting the first.
    pub fn create_from_mnemonic(
        name: &str,
        mnemonic: &str,
        passphrase: &str,
        initial_accounts: u32,
        now_ms: u64,
    ) -> Result<Self> {
        if initial_accounts == 0 {
            return Err(WalletError::UnsupportedOperation(
                "a wallet needs at least one account",
            ));
        }
        let identity = RootIdentity::new(mnemonic, passphrase)?;

        let accounts: Vec<WalletAccount> = (0..initial_accounts)
            .map(|index| {
                let address = identity.account_address_hex(index);
                WalletAccount {
                    id: account_id_for(&address),
                    label: format!("Account {}", index + 1),
                    address,
                    account_index: Some(index),
                    created_at_ms: now_ms,
                }
            })
            .collect();
        let selected_account_id = accounts[0].id.clone();

        Ok(Self {
            version: WALLET_VERSION,
            name: name.to_string(),
            created_at_ms: now_ms,
            accounts,
            selected_account_id,
            kind: WalletKind::MnemonicV1 {
                mnemonic: mnemonic.to_string(),
                passphrase: passphrase.to_string(),
                next_account_index: initial_accounts,
            },
        })
    }

    /// Create a wallet around one imported private key.
    pub fn create_from_privkey(name: &str, private_key_hex: &str, now_ms: u64) -> Result<Self> {
        let key_bytes = parse_hex32(private_key_hex)?;
        let address = RistrettoPrivate::from_bytes(&key_bytes)
            .public_key()
            .to_address_hex();
        let account = WalletAccount {
            id: account_id_for(&address),
            label: "Imported".to_string(),
            address,
            account_index: None,
            created_at_ms: now_ms,
        };
        let selected_account_id = account.id.clone();

        Ok(Self {
            version: WALLET_VERSION,
            name: name.to_string(),
            created_at_ms: now_ms,
            accounts: vec![account],
            selected_account_id,
            kind: WalletKind::PrivateKeyV1 {
                private_key_hex: private_key_hex.to_string(),
            },
        })
    }

    /// Derive and append the next account; only mnemonic wallets support
    /// this. The new account becomes selected.
    pub fn add_account(&mut self, now_ms: u64) -> Result<&WalletAccount> {
        let (mnemonic, passphrase, next_index) = match &self.kind {
            WalletKind::MnemonicV1 {
                mnemonic,
                passphrase,
                next_account_index,
            } => (mnemonic.clone(), passphrase.clone(), *next_account_index),
            WalletKind::PrivateKeyV1 { .. } => {
                return Err(WalletError::UnsupportedOperation(
                    "cannot add accounts to a private-key wallet",
                ))
            }
        };

        let identity = RootIdentity::new(&mnemonic, &passphrase)?;
        let address = identity.account_address_hex(next_index);
        let account = WalletAccount {
            id: account_id_for(&address),
            label: format!("Account {}", next_index + 1),
            address,
            account_index: Some(next_index),
            created_at_ms: now_ms,
        };

        self.selected_account_id = account.id.clone();
        self.accounts.push(account);
        if let WalletKind::MnemonicV1 {
            next_account_index, ..
        } = &mut self.kind
        {
            *next_account_index = next_index + 1;
        }

        Ok(self.accounts.last().expect("just pushed"))
    }

    /// Select an account by id.
    pub fn select_account(&mut self, id: &str) -> Result<()> {
        if !self.accounts.iter().any(|a| a.id == id) {
            return Err(WalletError::UnknownAccount(id.to_string()));
        }
        self.selected_account_id = id.to_string();
        Ok(())
    }

    /// The currently selected account.
    pub fn selected_account(&self) -> &WalletAccount {
        self.accounts
            .iter()
            .find(|a| a.id == self.selected_account_id)
            .expect("selected account id always references an account")
    }

    /// The private key for an account.
    ///
    /// Mnemonic wallets re-derive from the phrase on every call; nothing is
    /// cached.
    pub fn privkey_for(&self, id: &str) -> Result<RistrettoPrivate> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| WalletError::UnknownAccount(id.to_string()))?;

        match &self.kind {
            WalletKind::MnemonicV1 {
                mnemonic,
                passphrase,
                ..
            } => {
                let index = account
                    .account_index
                    .ok_or(WalletError::UnknownAccount(id.to_string()))?;
                let identity = RootIdentity::new(mnemonic, passphrase)?;
                Ok(identity.account_private_key(index))
            }
            WalletKind::PrivateKeyV1 { private_key_hex } => {
                let bytes = parse_hex32(private_key_hex)?;
                Ok(RistrettoPrivate::from_bytes(&bytes))
            }
        }
    }

    /// Parse a stored wallet payload of any recognized version.
    ///
    /// Version-2 payloads are parsed directly; the legacy
    /// `{"privateKeyHex": …}` shape is migrated to a version-2 private-key
    /// wallet. Anything else is a hard error.
    pub fn parse_any(payload: &[u8], now_ms: u64) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(payload).map_err(|_| WalletError::UnknownPayload)?;

        if value.get("version").and_then(|v| v.as_u64()) == Some(WALLET_VERSION as u64) {
            let wallet: WalletData =
                serde_json::from_value(value).map_err(|_| WalletError::UnknownPayload)?;
            wallet.validate()?;
            return Ok(wallet);
        }

        if let Some(key_hex) = value.get("privateKeyHex").and_then(|v| v.as_str()) {
            return Self::create_from_privkey("Imported Wallet", key_hex, now_ms);
        }

        Err(WalletError::UnknownPayload)
    }

    /// Check the structural invariants of a deserialized wallet.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(WalletError::UnknownPayload);
        }
        if !self
            .accounts
            .iter()
            .any(|a| a.id == self.selected_account_id)
        {
            return Err(WalletError::UnknownAccount(self.selected_account_id.clone()));
        }

        match &self.kind {
            WalletKind::MnemonicV1 {
                next_account_index, ..
            } => {
                let mut seen = std::collections::HashSet::new();
                for account in &self.accounts {
                    match account.account_index {
                        Some(index) if index < *next_account_index && seen.insert(index) => {}
                        _ => return Err(WalletError::UnknownPayload),
                    }
                }
            }
            WalletKind::PrivateKeyV1 { .. } => {
                if self.accounts.len() != 1 {
                    return Err(WalletError::UnknownPayload);
                }
            }
        }
        Ok(())
    }

    /// Serialize for vault storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
