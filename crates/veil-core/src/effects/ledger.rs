//! Ledger read effects (handle source)
//!
//! Read-only queries against the token contract: which items an owner
//! holds, each item's public classification, and the opaque ciphertext
//! handles for its encrypted attributes. Implementations live in
//! `veil-effects`; this crate defines only the interface.

use crate::types::{CiphertextHandle, ItemId, OwnerAddress, Rarity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ledger read errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum LedgerError {
    /// The read failed at the transport layer
    #[error("ledger read failed: {reason}")]
    Transport {
        /// Reason for the failure
        reason: String,
    },
    /// The queried item does not exist
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    /// The classification field held a discriminant outside the closed enum
    #[error("invalid classification discriminant {0}")]
    InvalidClassification(u8),
}

/// Read-only queries over the token ledger
///
/// All methods are pure reads; none mutate chain state.
#[async_trait]
pub trait LedgerEffects: Send + Sync {
    /// Token ids owned by `owner`, in ledger enumeration order
    async fn owned_item_ids(&self, owner: &OwnerAddress) -> Result<Vec<ItemId>, LedgerError>;

    /// Public classification of an item
    async fn rarity_of(&self, id: ItemId) -> Result<Rarity, LedgerError>;

    /// Ciphertext handle of the item's attack attribute
    async fn attack_handle_of(&self, id: ItemId) -> Result<CiphertextHandle, LedgerError>;

    /// Ciphertext handle of the item's defense attribute
    async fn defense_handle_of(&self, id: ItemId) -> Result<CiphertextHandle, LedgerError>;
}
