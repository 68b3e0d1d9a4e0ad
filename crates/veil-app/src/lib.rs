//! Veil App - Portable headless inventory and disclosure core
//!
//! The application layer frontends drive: load an owner's items from the
//! ledger, render the read model, and reveal encrypted attributes on demand
//! through owner-authorized relay disclosure. No UI, no wallet, no
//! transport; those arrive as effect handlers from the embedding frontend.
//!
//! # Flow
//!
//! ```text
//! InventoryCoordinator::load ── LedgerEffects
//!          │
//!   reveal(item_id) ── session: keypair → envelope → SignerEffects
//!          │                                  │
//!          └── generation-checked commit ←── DisclosureClient → RelayEffects
//! ```
//!
//! Each item's reveal is an independent asynchronous operation; the signing
//! prompt and the relay round trip suspend without blocking other items or
//! the read model.

#![forbid(unsafe_code)]

/// Inventory coordination and disclosure policy
pub mod coordinator;

/// Disclosure pipeline: client and per-item session
pub mod disclosure;

/// View state for frontends
pub mod views;

pub use coordinator::{
    DisclosurePolicy, InventoryCoordinator, RevealOutcome, DEFAULT_RELAY_TIMEOUT,
    DEFAULT_VALIDITY_DAYS,
};
pub use disclosure::{DisclosedAttributes, DisclosureClient, ItemDisclosureContext};
pub use views::{InventoryPhase, InventoryState};
