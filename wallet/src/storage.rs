//! Host persistence interface.
//!
//! The host owns real storage (browser storage, files, a keychain). The
//! core only ever sees opaque byte blobs behind string keys.

use crate::error::{Result, WalletError};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Key under which the encrypted vault record is stored.
pub const VAULT_KEY: &str = "catalyst_wallet_vault_v1";

/// Key under which the preferred RPC URL is stored (utf-8).
pub const RPC_URL_KEY: &str = "catalyst_wallet_rpc_url";

/// Storage key for the tracked-transaction list of one address.
pub fn tracked_txs_key(network_id: &str, address: &str) -> String {
    format!(
        "catalyst_wallet_txs_v1:{}:{}",
        network_id,
        address.to_ascii_lowercase()
    )
}

/// Storage key for the cached RPC history of one address.
pub fn chain_history_key(network_id: &str, address: &str) -> String {
    format!(
        "catalyst_wallet_chain_history_v1:{}:{}",
        network_id,
        address.to_ascii_lowercase()
    )
}

/// Opaque key-value persistence, provided by the host.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete the value under `key`, if present.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, used by tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryStore {
    cells: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cells.lock().expect("poisoned store").get(key).cloned())
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.cells
            .lock()
            .expect("poisoned store")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.cells.lock().expect("poisoned store").remove(key);
        Ok(())
    }
}

/// File-backed store: one file per key under a root directory.
///
/// Files are written with owner-only permissions on unix since the vault
/// record, while encrypted, still does not belong in world-readable files.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| WalletError::Storage(e.to_string()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys contain ':' separators which are not portable file name
        // characters.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(name)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WalletError::Storage(e.to_string())),
        }
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);

        #[cfg(unix)]
        {
            use std::{io::Write, os::unix::fs::OpenOptionsExt};
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)
                .map_err(|e| WalletError::Storage(e.to_string()))?;
            file.write_all(value)
                .map_err(|e| WalletError::Storage(e.to_string()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, value).map_err(|e| WalletError::Storage(e.to_string()))?;
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WalletError::Storage(e.to_string())),
        }
    }
}
