//! Per-sender nonce allocation.
//!
//! Rapid consecutive sends must each get a distinct, contiguous nonce even
//! though broadcasts overlap. Each sender address owns a FIFO critical
//! section; the allocator hands out `floor, floor+1, …` and only talks to
//! the chain once, to learn the initial floor. If another process spends
//! from the same account, the loss surfaces as a broadcast error and the
//! floor is re-read on the next refresh.

use crate::error::Result;
use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

struct AddressSlot {
    // None until the committed nonce has been observed once.
    state: tokio::sync::Mutex<Option<u64>>,
}

/// Allocates strictly increasing nonces per sender address.
#[derive(Default)]
pub struct NonceAllocator {
    slots: Mutex<HashMap<String, Arc<AddressSlot>>>,
}

impl NonceAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, sender: &str) -> Arc<AddressSlot> {
        let mut slots = self.slots.lock().expect("poisoned nonce map");
        slots
            .entry(sender.to_string())
            .or_insert_with(|| {
                Arc::new(AddressSlot {
                    state: tokio::sync::Mutex::new(None),
                })
            })
            .clone()
    }

    /// Allocate the next nonce for `sender`.
    ///
    /// Calls are serialized per sender in FIFO order (the underlying tokio
    /// mutex is fair). On first use `fetch_committed` is awaited inside the
    /// critical section to learn the committed nonce; the first allocation
    /// is then `committed + 1`. The lock is released on every path.
    pub async fn allocate<F, Fut>(&self, sender: &str, fetch_committed: F) -> Result<u64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64>>,
    {
        let slot = self.slot(sender);
        let mut state = slot.state.lock().await;

        let next = match *state {
            Some(next) => next,
            None => fetch_committed().await? + 1,
        };
        *state = Some(next + 1);
        Ok(next)
    }

    /// Raise the floor after observing a committed nonce on-chain.
    ///
    /// The floor only ever moves up; a stale observation cannot hand out an
    /// already-burned nonce.
    pub async fn bump_floor(&self, sender: &str, committed: u64) {
        let slot = self.slot(sender);
        let mut state = slot.state.lock().await;
        let candidate = committed + 1;
        *state = Some(match *state {
            Some(current) => current.max(candidate),
            None => candidate,
        });
    }

    /// The next nonce that would be allocated, if known.
    pub async fn peek(&self, sender: &str) -> Option<u64> {
        let slot = self.slot(sender);
        let state = slot.state.lock().await;
        *state
    }
}
