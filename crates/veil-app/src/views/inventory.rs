//! # Inventory View State
//!
//! The read model frontends render: the owner's items in ledger order, each
//! carrying its own disclosure state, plus an inventory-level phase for the
//! load lifecycle. Counts are computed, not stored, to prevent sync bugs.
//!
//! The per-item "decrypting"/"error" side tables of ad-hoc frontends are
//! deliberately absent: disclosure state lives on the item record itself,
//! keyed by the typed item id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use veil_core::{DisclosureStatus, ItemId, ItemRecord, OwnerAddress};

/// Inventory-level load lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InventoryPhase {
    /// No owner connected
    #[default]
    Idle,
    /// A load is in progress; previously loaded items remain visible
    Loading,
    /// The current owner's items are loaded
    Ready,
    /// The last load failed; previously loaded items remain untouched
    Failed(String),
}

/// Authoritative inventory state
///
/// Owned exclusively by the coordinator; items are kept in ledger
/// enumeration order. The generation counter increments whenever the item
/// collection is replaced or cleared, so results of disclosure sessions
/// started against an older collection can be recognized and discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryState {
    owner: Option<OwnerAddress>,
    items: IndexMap<ItemId, ItemRecord>,
    phase: InventoryPhase,
    generation: u64,
    load_epoch: u64,
}

impl InventoryState {
    /// Create an empty, idle inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// The connected owner, if any
    pub fn owner(&self) -> Option<&OwnerAddress> {
        self.owner.as_ref()
    }

    /// Current load phase
    pub fn phase(&self) -> &InventoryPhase {
        &self.phase
    }

    /// Context generation of the current item collection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All items in ledger order
    pub fn items(&self) -> Vec<ItemRecord> {
        self.items.values().cloned().collect()
    }

    /// One item by id
    pub fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    /// Number of items with both attributes revealed (computed)
    pub fn revealed_count(&self) -> usize {
        self.items
            .values()
            .filter(|item| item.status.is_revealed())
            .count()
    }

    /// Number of items still locked or failed (computed)
    pub fn locked_count(&self) -> usize {
        self.items.len() - self.revealed_count()
    }

    /// Number of disclosure sessions currently in flight (computed)
    pub fn in_flight_count(&self) -> usize {
        self.items
            .values()
            .filter(|item| item.status.is_in_flight())
            .count()
    }

    /// Epoch of the most recently started load
    pub(crate) fn load_epoch(&self) -> u64 {
        self.load_epoch
    }

    /// Mark a load as started, keeping existing items visible
    ///
    /// Bumps the load epoch: an earlier load still reading the ledger is
    /// superseded and its result must be discarded.
    pub(crate) fn begin_load(&mut self) {
        self.phase = InventoryPhase::Loading;
        self.load_epoch += 1;
    }

    /// Install a freshly loaded collection for `owner`
    ///
    /// Replaces the whole item map and bumps the generation: in-flight
    /// session results against the previous collection become stale.
    pub(crate) fn install(&mut self, owner: OwnerAddress, items: Vec<ItemRecord>) {
        self.owner = Some(owner);
        self.items = items.into_iter().map(|item| (item.id, item)).collect();
        self.phase = InventoryPhase::Ready;
        self.generation += 1;
    }

    /// Record a failed load, leaving items and generation untouched
    pub(crate) fn load_failed(&mut self, reason: String) {
        self.phase = InventoryPhase::Failed(reason);
    }

    /// Disconnect: clear everything and invalidate in-flight sessions
    pub(crate) fn clear(&mut self) {
        self.owner = None;
        self.items.clear();
        self.phase = InventoryPhase::Idle;
        self.generation += 1;
    }

    /// Set the disclosure status of one item
    ///
    /// Returns false when the item is not in the collection.
    pub(crate) fn set_status(&mut self, id: ItemId, status: DisclosureStatus) -> bool {
        match self.items.get_mut(&id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Commit a successful disclosure: set both plaintexts atomically
    ///
    /// Refuses to rewrite an already revealed record; plaintext fields are
    /// immutable once set for the record's lifetime.
    pub(crate) fn commit_revealed(&mut self, id: ItemId, attack: u64, defense: u64) -> bool {
        match self.items.get_mut(&id) {
            Some(item) if item.attack.is_none() && item.defense.is_none() => {
                item.attack = Some(attack);
                item.defense = Some(defense);
                item.status = DisclosureStatus::Revealed;
                true
            }
            _ => false,
        }
    }
}
