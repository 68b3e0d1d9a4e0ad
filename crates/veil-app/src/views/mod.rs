//! View state for frontends

pub mod inventory;

pub use inventory::{InventoryPhase, InventoryState};
