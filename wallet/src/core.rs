//! The wallet core: one owned value holding all mutable state.
//!
//! `WalletCore` owns the RPC client, the nonce allocator, the receipt
//! tracker and the unlocked session, and exposes the end-to-end flows:
//! onboarding, unlock, account management, and the full send path
//! (identity check, funds check, nonce allocation, build, sign, broadcast,
//! track).

use crate::{
    chain::ChainGuard,
    config::NetworkConfig,
    error::{Result, WalletError},
    now_ms,
    nonce::NonceAllocator,
    rpc::{FeeEstimateRequest, RpcClient},
    storage::{chain_history_key, KeyValueStore, RPC_URL_KEY, VAULT_KEY},
    tracker::TxTracker,
    vault::VaultRecord,
    wallet::{WalletAccount, WalletData},
};
use ctl_crypto_keys::sign as schnorr_sign;
use ctl_transaction_core::{build_transfer, parse_hex32, CodecError, Tx};
use serde_json::Value;
use tracing::{debug, info};
use zeroize::Zeroize;

/// How many history entries a refresh asks for.
const HISTORY_LIMIT: u32 = 50;

struct Session {
    wallet: WalletData,
    password: String,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// The outcome of a successful broadcast.
#[derive(Clone, Debug)]
pub struct SubmittedTransfer {
    /// Locally computed transaction id.
    pub local_id: String,
    /// Id the broadcast endpoint returned.
    pub server_id: String,
    /// The nonce the transfer was signed with.
    pub nonce: u64,
    /// The fee the transfer pays.
    pub fee: u64,
    /// Signing timestamp, unix milliseconds.
    pub timestamp_ms: u64,
}

/// Balance and committed nonce of the selected account.
#[derive(Clone, Copy, Debug)]
pub struct AccountStatus {
    /// Current balance.
    pub balance: u128,
    /// Last committed nonce.
    pub committed_nonce: u64,
}

/// The non-custodial wallet core.
pub struct WalletCore<S: KeyValueStore> {
    config: NetworkConfig,
    store: S,
    rpc: RpcClient,
    guard: ChainGuard,
    nonces: NonceAllocator,
    tracker: TxTracker,
    session: Option<Session>,
}

impl<S: KeyValueStore> WalletCore<S> {
    /// Build a core for `config`, persisting through `store`.
    ///
    /// A previously stored preferred RPC URL takes effect immediately.
    pub fn new(config: NetworkConfig, store: S) -> Self {
        let mut rpc = RpcClient::new(config.rpc_urls.clone());
        if let Ok(Some(bytes)) = store.load(RPC_URL_KEY) {
            if let Ok(url) = String::from_utf8(bytes) {
                rpc.prefer_url(&url);
            }
        }
        let guard = ChainGuard::new(&config);
        let tracker = TxTracker::new(&config.network_id);

        Self {
            config,
            store,
            rpc,
            guard,
            nonces: NonceAllocator::new(),
            tracker,
            session: None,
        }
    }

    /// Whether a vault record exists in storage.
    pub fn has_vault(&self) -> Result<bool> {
        Ok(self.store.load(VAULT_KEY)?.is_some())
    }

    /// Whether a session is active.
    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    /// The unlocked wallet.
    pub fn wallet(&self) -> Result<&WalletData> {
        self.session
            .as_ref()
            .map(|s| &s.wallet)
            .ok_or(WalletError::WalletLocked)
    }

    /// Create a mnemonic wallet, encrypt it under `password`, persist the
    /// vault and open a session.
    pub fn create_wallet_from_mnemonic(
        &mut self,
        name: &str,
        mnemonic: &str,
        passphrase: &str,
        initial_accounts: u32,
        password: &str,
    ) -> Result<()> {
        let wallet =
            WalletData::create_from_mnemonic(name, mnemonic, passphrase, initial_accounts, now_ms())?;
        self.install_wallet(wallet, password)
    }

    /// Create a wallet around an imported private key.
    pub fn create_wallet_from_private_key(
        &mut self,
        name: &str,
        private_key_hex: &str,
        password: &str,
    ) -> Result<()> {
        let wallet = WalletData::create_from_privkey(name, private_key_hex, now_ms())?;
        self.install_wallet(wallet, password)
    }

    fn install_wallet(&mut self, wallet: WalletData, password: &str) -> Result<()> {
        let record = VaultRecord::create(password, &wallet.to_bytes()?)?;
        self.store.store(VAULT_KEY, &record.to_bytes()?)?;

        let address = wallet.selected_account().address.clone();
        self.session = Some(Session {
            wallet,
            password: password.to_string(),
        });
        self.tracker.load(&self.store, &address)?;
        info!("wallet created, selected account {address}");
        Ok(())
    }

    /// Open the vault and start a session.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        let bytes = self
            .store
            .load(VAULT_KEY)?
            .ok_or_else(|| WalletError::Storage("no vault record found".to_string()))?;
        let record = VaultRecord::from_bytes(&bytes)?;
        let plaintext = record.open(password)?;
        let wallet = WalletData::parse_any(&plaintext, now_ms())?;

        let address = wallet.selected_account().address.clone();
        self.session = Some(Session {
            wallet,
            password: password.to_string(),
        });
        self.tracker.load(&self.store, &address)?;
        Ok(())
    }

    /// Drop the session and its plaintext secrets.
    pub fn lock(&mut self) {
        self.session = None;
    }

    /// Re-encrypt the vault under a new password. Requires an unlocked
    /// session with the current password.
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<()> {
        let bytes = self
            .store
            .load(VAULT_KEY)?
            .ok_or_else(|| WalletError::Storage("no vault record found".to_string()))?;
        let record = VaultRecord::from_bytes(&bytes)?;
        let rotated = record.change_password(old_password, new_password)?;
        self.store.store(VAULT_KEY, &rotated.to_bytes()?)?;

        if let Some(session) = self.session.as_mut() {
            session.password.zeroize();
            session.password = new_password.to_string();
        }
        Ok(())
    }

    /// Derive and select the next account, persisting the updated wallet.
    pub fn add_account(&mut self) -> Result<WalletAccount> {
        let session = self.session.as_mut().ok_or(WalletError::WalletLocked)?;
        let account = session.wallet.add_account(now_ms())?.clone();
        self.persist_session_wallet()?;
        self.tracker.load(&self.store, &account.address)?;
        Ok(account)
    }

    /// Select an account by id, persisting the choice and re-reading its
    /// tracked transactions.
    pub fn select_account(&mut self, id: &str) -> Result<()> {
        let session = self.session.as_mut().ok_or(WalletError::WalletLocked)?;
        session.wallet.select_account(id)?;
        let address = session.wallet.selected_account().address.clone();
        self.persist_session_wallet()?;
        self.tracker.load(&self.store, &address)?;
        Ok(())
    }

    /// Every wallet mutation rewrites the vault with the session password.
    fn persist_session_wallet(&mut self) -> Result<()> {
        let session = self.session.as_ref().ok_or(WalletError::WalletLocked)?;
        let record = VaultRecord::create(&session.password, &session.wallet.to_bytes()?)?;
        self.store.store(VAULT_KEY, &record.to_bytes()?)
    }

    /// Persist and apply a preferred RPC endpoint.
    pub fn set_preferred_rpc_url(&mut self, url: &str) -> Result<bool> {
        self.store.store(RPC_URL_KEY, url.as_bytes())?;
        Ok(self.rpc.prefer_url(url))
    }

    fn selected_address(&self) -> Result<String> {
        Ok(self.wallet()?.selected_account().address.clone())
    }

    /// Verify the endpoint's chain identity against the configuration.
    pub async fn verify_chain(&mut self) -> Result<()> {
        self.guard.assert_chain_identity(&mut self.rpc).await
    }

    /// Balance and committed nonce of the selected account.
    ///
    /// Also raises the nonce floor, so external activity on the account is
    /// picked up by the next allocation.
    pub async fn refresh(&mut self) -> Result<AccountStatus> {
        let address = self.selected_address()?;
        let balance = self.rpc.get_balance(&address).await?;
        let committed_nonce = self.rpc.get_nonce(&address).await?;
        self.nonces.bump_floor(&address, committed_nonce).await;
        Ok(AccountStatus {
            balance,
            committed_nonce,
        })
    }

    /// Current balance of the selected account.
    pub async fn balance(&mut self) -> Result<u128> {
        Ok(self.refresh().await?.balance)
    }

    /// Send `amount` to `to` from the selected account.
    ///
    /// The chain identity is re-verified immediately before the broadcast;
    /// a cached verification is not trusted. A broadcast rejected on nonce
    /// grounds refreshes the floor and retries exactly once with a freshly
    /// allocated nonce before surfacing [`WalletError::NonceRace`].
    pub async fn send_transfer(&mut self, to: &str, amount: u64) -> Result<SubmittedTransfer> {
        let from = self.selected_address()?;
        let from_bytes = parse_hex32(&from)?;
        let to_bytes = parse_hex32(to)?;
        let to_canonical = ctl_transaction_core::to_hex32(&to_bytes);
        let amount_i64 =
            i64::try_from(amount).map_err(|_| WalletError::Codec(CodecError::EncodeRange))?;

        self.guard.assert_chain_identity(&mut self.rpc).await?;

        let fee = self
            .rpc
            .estimate_fee(&FeeEstimateRequest::transfer(&from, &to_canonical, amount))
            .await?;
        let have = self.rpc.get_balance(&from).await?;

        // A self-transfer only burns the fee.
        let need = if from == to_canonical {
            u128::from(fee)
        } else {
            u128::from(amount) + u128::from(fee)
        };
        if have < need {
            return Err(WalletError::InsufficientFunds { have, need });
        }

        let session = self.session.as_ref().ok_or(WalletError::WalletLocked)?;
        let private = session
            .wallet
            .privkey_for(&session.wallet.selected_account_id)?;
        let genesis_hash = self.config.genesis_hash_bytes()?;
        let chain_id = self.config.chain_id;

        for attempt in 0..2 {
            let nonce = {
                let (nonces, rpc) = (&self.nonces, &mut self.rpc);
                let fetch_address = from.clone();
                nonces
                    .allocate(&from, move || async move {
                        rpc.get_nonce(&fetch_address).await
                    })
                    .await?
            };

            let core = build_transfer(&from_bytes, &to_bytes, amount_i64, nonce, fee)?;
            let timestamp_ms = now_ms();
            let payload = core.signing_payload(chain_id, &genesis_hash, timestamp_ms)?;
            let signature = schnorr_sign(&private, &payload);
            let tx = Tx::new(core, signature.as_ref(), timestamp_ms)?;
            let wire_hex = format!("0x{}", hex::encode(tx.wire_bytes()?));
            let local_id = tx.id_hex()?;

            match self.rpc.send_raw_transaction(&wire_hex).await {
                Ok(server_id) => {
                    debug!("broadcast accepted, nonce {nonce}, id {server_id}");
                    self.tracker.track(
                        &self.store,
                        &from,
                        &local_id,
                        Some(server_id.clone()),
                        timestamp_ms,
                    )?;
                    return Ok(SubmittedTransfer {
                        local_id,
                        server_id,
                        nonce,
                        fee,
                        timestamp_ms,
                    });
                }
                Err(error) => {
                    // Whatever went wrong, re-sync the floor so the next
                    // allocation starts from the chain's view.
                    if let Ok(committed) = self.rpc.get_nonce(&from).await {
                        self.nonces.bump_floor(&from, committed).await;
                    }
                    if is_nonce_race(&error) {
                        if attempt == 0 {
                            debug!("nonce {nonce} lost a race, retrying with a fresh floor");
                            continue;
                        }
                        return Err(WalletError::NonceRace);
                    }
                    return Err(error);
                }
            }
        }
        unreachable!("send loop returns within two attempts")
    }

    /// One receipt-polling tick for the selected account.
    ///
    /// On any transition to `applied`, balance/nonce and history are
    /// refreshed. Returns the local ids that newly applied.
    pub async fn poll_receipts(&mut self) -> Result<Vec<String>> {
        let address = self.selected_address()?;
        let applied = self
            .tracker
            .poll_once(&mut self.rpc, &self.store, &address, now_ms())
            .await?;

        if !applied.is_empty() {
            // Best effort; the next tick will try again.
            let _ = self.refresh().await;
            let _ = self.fetch_history(HISTORY_LIMIT).await;
        }
        Ok(applied)
    }

    /// Tracked transactions of the selected account, newest first.
    pub fn tracked_transactions(&self) -> Result<&[crate::tracker::TrackedTransaction]> {
        let address = self.selected_address()?;
        Ok(self.tracker.entries(&address))
    }

    /// Fetch recent history for the selected account and cache it.
    pub async fn fetch_history(&mut self, limit: u32) -> Result<Vec<Value>> {
        let address = self.selected_address()?;
        let history = self
            .rpc
            .get_transactions_by_address(&address, None, limit)
            .await?;

        let key = chain_history_key(&self.config.network_id, &address);
        self.store.store(&key, &serde_json::to_vec(&history)?)?;
        Ok(history)
    }

    /// Cached history from the last successful fetch.
    pub fn cached_history(&self) -> Result<Vec<Value>> {
        let address = self.selected_address()?;
        let key = chain_history_key(&self.config.network_id, &address);
        match self.store.load(&key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }
}

fn is_nonce_race(error: &WalletError) -> bool {
    matches!(
        error,
        WalletError::RpcProtocol { message, .. }
            if message.to_ascii_lowercase().contains("nonce")
    )
}
