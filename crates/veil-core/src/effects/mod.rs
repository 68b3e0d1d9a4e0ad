//! Pure effect interfaces (no implementations)
//!
//! Trait definitions for everything the disclosure pipeline touches outside
//! its own memory: the token ledger, the owner's signer, the decryption
//! relay, session key generation, and the clock. Handlers live in
//! `veil-effects`; application code depends only on these traits.

pub mod keys;
pub mod ledger;
pub mod relay;
pub mod signer;
pub mod time;

pub use keys::SessionKeyEffects;
pub use ledger::{LedgerEffects, LedgerError};
pub use relay::{RelayEffects, RelayError};
pub use signer::{SignerEffects, SignerError};
pub use time::TimeEffects;
