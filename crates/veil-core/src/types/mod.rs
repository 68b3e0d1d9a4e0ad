//! Core data model for the Veil workspace

pub mod identifiers;
pub mod item;

pub use identifiers::{CiphertextHandle, ItemId, OwnerAddress, ScopeAddress};
pub use item::{DisclosureStatus, ItemRecord, Rarity};
