//! Veil Core - Foundation types and effect interfaces
//!
//! This crate provides the data model, error taxonomy, authorization
//! envelope types, and pure effect trait definitions for the Veil
//! encrypted-attribute disclosure pipeline. It contains no I/O and no
//! handler implementations.
//!
//! # Layering
//!
//! - `veil-core` (this crate): types + trait interfaces
//! - `veil-effects`: effect handlers (clock, ledger, signer, relay, keys)
//! - `veil-app`: the headless application core frontends drive
//!
//! # Key invariants
//!
//! - Plaintext attribute fields are `None` until a disclosure for the
//!   record's exact handles succeeds, then immutable for the record's
//!   lifetime.
//! - An authorization envelope covers a non-empty scope set and a positive
//!   validity window; its canonical signing payload is byte-stable.
//! - Ephemeral session key material is never serialized, persisted, or
//!   reused; private halves are zeroized on drop.

#![forbid(unsafe_code)]

/// Item data model and identifier newtypes
pub mod types;

/// Unified disclosure error taxonomy
pub mod errors;

/// Authorization envelopes and relay request context
pub mod envelope;

/// Pure effect interfaces (no implementations)
pub mod effects;

pub use envelope::{
    AuthorizationEnvelope, EnvelopeError, EphemeralKeypair, HandleScopePair, RelayDecryptRequest,
    SignedAuthorization, SigningDomain, TypedAuthorizationMessage, AUTHORIZATION_PRIMARY_TYPE,
};
pub use errors::{DisclosureError, DisclosureResult};
pub use types::{
    CiphertextHandle, DisclosureStatus, ItemId, ItemRecord, OwnerAddress, Rarity, ScopeAddress,
};
