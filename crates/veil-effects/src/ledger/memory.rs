//! In-memory ledger handler
//!
//! Backs tests and simulation with a minted-item table that answers the
//! same queries the token contract exposes on chain. A failure toggle
//! simulates transport errors for load-path coverage.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use veil_core::effects::{LedgerEffects, LedgerError};
use veil_core::{CiphertextHandle, ItemId, OwnerAddress, Rarity};

/// One minted item as the ledger sees it
#[derive(Debug, Clone)]
pub struct MintedItem {
    /// Owning account
    pub owner: OwnerAddress,
    /// Public classification
    pub rarity: Rarity,
    /// Ciphertext handle for the attack attribute
    pub attack_handle: CiphertextHandle,
    /// Ciphertext handle for the defense attribute
    pub defense_handle: CiphertextHandle,
}

/// In-memory ledger handler
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerHandler {
    items: Arc<Mutex<BTreeMap<ItemId, MintedItem>>>,
    fail_reads: Arc<AtomicBool>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
    reads: Arc<AtomicUsize>,
}

impl MemoryLedgerHandler {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an item into the table
    pub fn mint(&self, id: ItemId, item: MintedItem) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(id, item);
        }
    }

    /// Make every subsequent read fail at the transport layer
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Hold enumeration reads until [`Self::release`] is called
    ///
    /// Each held read consumes one release. Releasing before the read
    /// arrives is fine; the permit is stored.
    pub fn hold_reads(&self) {
        if let Ok(mut gate) = self.gate.lock() {
            *gate = Some(Arc::new(Notify::new()));
        }
    }

    /// Release one held enumeration read
    pub fn release(&self) {
        if let Ok(gate) = self.gate.lock() {
            if let Some(notify) = gate.as_ref() {
                notify.notify_one();
            }
        }
    }

    /// Stop holding reads (already-held reads still need a release)
    pub fn unhold(&self) {
        if let Ok(mut gate) = self.gate.lock() {
            *gate = None;
        }
    }

    /// Number of enumeration reads received
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn current_gate(&self) -> Option<Arc<Notify>> {
        self.gate.lock().ok().and_then(|gate| gate.clone())
    }

    fn check_transport(&self) -> Result<(), LedgerError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport {
                reason: "simulated transport failure".into(),
            });
        }
        Ok(())
    }

    fn with_item<T>(
        &self,
        id: ItemId,
        f: impl FnOnce(&MintedItem) -> T,
    ) -> Result<T, LedgerError> {
        self.check_transport()?;
        let items = self.items.lock().map_err(|_| LedgerError::Transport {
            reason: "ledger table poisoned".into(),
        })?;
        items.get(&id).map(f).ok_or(LedgerError::UnknownItem(id))
    }
}

#[async_trait]
impl LedgerEffects for MemoryLedgerHandler {
    async fn owned_item_ids(&self, owner: &OwnerAddress) -> Result<Vec<ItemId>, LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.current_gate() {
            gate.notified().await;
        }
        self.check_transport()?;
        let items = self.items.lock().map_err(|_| LedgerError::Transport {
            reason: "ledger table poisoned".into(),
        })?;
        Ok(items
            .iter()
            .filter(|(_, item)| &item.owner == owner)
            .map(|(id, _)| *id)
            .collect())
    }

    async fn rarity_of(&self, id: ItemId) -> Result<Rarity, LedgerError> {
        self.with_item(id, |item| item.rarity)
    }

    async fn attack_handle_of(&self, id: ItemId) -> Result<CiphertextHandle, LedgerError> {
        self.with_item(id, |item| item.attack_handle.clone())
    }

    async fn defense_handle_of(&self, id: ItemId) -> Result<CiphertextHandle, LedgerError> {
        self.with_item(id, |item| item.defense_handle.clone())
    }
}
