//! Veil Effects - Handlers for the effect interfaces in `veil-core`
//!
//! Stateless or in-memory implementations of the clock, session key
//! generation, ledger, signer, and relay effects. Production deployments
//! swap the ledger and relay handlers for real transports; the trait
//! surface in `veil-core` is the only coupling.

#![forbid(unsafe_code)]

/// Time handlers (system clock and pinned test clock)
pub mod time;

/// Session key generation from OS randomness
pub mod keys;

/// Ledger handlers
pub mod ledger;

/// Signer handlers
pub mod signer;

/// Relay handlers
pub mod relay;

pub use keys::OsRngKeyHandler;
pub use ledger::{MemoryLedgerHandler, MintedItem};
pub use relay::{MemoryRelayHandler, RelayMode};
pub use signer::{LocalSignerHandler, ScriptedSignerHandler, SignerScript};
pub use time::{FixedTimeHandler, RealTimeHandler};
