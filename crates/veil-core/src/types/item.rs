//! Item data model and per-item disclosure state

use crate::errors::DisclosureError;
use crate::types::identifiers::{CiphertextHandle, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public classification of an item
///
/// A closed enum mirroring the on-chain field; the ledger stores it as a
/// `u8` discriminant in `{0, 1, 2}`. Anything else is a ledger error, not a
/// fourth rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rarity {
    /// Common item (discriminant 0)
    #[default]
    Common,
    /// Rare item (discriminant 1)
    Rare,
    /// Legendary item (discriminant 2)
    Legendary,
}

impl Rarity {
    /// Display label used by frontends
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }

    /// The on-chain discriminant
    pub fn discriminant(&self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Rare => 1,
            Rarity::Legendary => 2,
        }
    }
}

impl TryFrom<u8> for Rarity {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rarity::Common),
            1 => Ok(Rarity::Rare),
            2 => Ok(Rarity::Legendary),
            other => Err(other),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-item disclosure lifecycle
///
/// `Locked -> Disclosing -> {Revealed, Failed}`; `Failed` may transition back
/// to `Disclosing` on retry. `Revealed` is terminal for the record's
/// lifetime; a fresh inventory load rebuilds records in `Locked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DisclosureStatus {
    /// Attributes are still ciphertext; no disclosure attempted or a prior
    /// attempt has been cleared by a reload
    #[default]
    Locked,
    /// A disclosure session is in flight for this item
    Disclosing,
    /// Both attributes have been revealed
    Revealed,
    /// The last disclosure attempt failed; retry is allowed
    Failed(DisclosureError),
}

impl DisclosureStatus {
    /// Whether a disclosure session is currently in flight
    pub fn is_in_flight(&self) -> bool {
        matches!(self, DisclosureStatus::Disclosing)
    }

    /// Whether the item's attributes have been revealed
    pub fn is_revealed(&self) -> bool {
        matches!(self, DisclosureStatus::Revealed)
    }

    /// The failure reason, if the last attempt failed
    pub fn failure(&self) -> Option<&DisclosureError> {
        match self {
            DisclosureStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// An owned item: public fields plus lazily revealed encrypted attributes
///
/// Invariant: `attack` and `defense` stay `None` until a disclosure for this
/// record's exact handles succeeds, and are then never rewritten for the
/// record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Token identifier
    pub id: ItemId,
    /// Public classification
    pub rarity: Rarity,
    /// Ciphertext handle for the attack attribute (assigned at mint)
    pub attack_handle: CiphertextHandle,
    /// Ciphertext handle for the defense attribute (assigned at mint)
    pub defense_handle: CiphertextHandle,
    /// Plaintext attack value, present only after successful disclosure
    pub attack: Option<u64>,
    /// Plaintext defense value, present only after successful disclosure
    pub defense: Option<u64>,
    /// Disclosure lifecycle state for this record
    pub status: DisclosureStatus,
}

impl ItemRecord {
    /// Create a freshly loaded, locked record
    pub fn locked(
        id: ItemId,
        rarity: Rarity,
        attack_handle: CiphertextHandle,
        defense_handle: CiphertextHandle,
    ) -> Self {
        Self {
            id,
            rarity,
            attack_handle,
            defense_handle,
            attack: None,
            defense: None,
            status: DisclosureStatus::Locked,
        }
    }
}
