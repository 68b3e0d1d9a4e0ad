//! Core identifier types used across the Veil crates
//!
//! Items are identified by their on-chain token id. Accounts and contracts
//! are hex addresses, normalized to lowercase so that map lookups and
//! equality never depend on the caller's checksum casing. Ciphertext handles
//! are opaque: nothing in this workspace interprets their contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token identifier for an owned item
///
/// Unique within one owner's collection; assigned by the ledger at mint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Create an item id from the raw token id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw token id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Hex account address of an item owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerAddress(String);

impl OwnerAddress {
    /// Create an owner address, normalizing to lowercase
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_lowercase())
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Contract address a ciphertext handle is valid under
///
/// Disclosure authorizations enumerate scope addresses; a handle may only be
/// decrypted under an authorization whose scope list contains its contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeAddress(String);

impl ScopeAddress {
    /// Create a scope address, normalizing to lowercase
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_lowercase())
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Opaque on-chain handle denoting an encrypted value
///
/// Meaningless without the relay's decryption capability. Handles are
/// compared byte-for-byte; the relay returns plaintexts keyed by the exact
/// handle strings it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CiphertextHandle(String);

impl CiphertextHandle {
    /// Create a handle from its on-chain string form
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the handle string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CiphertextHandle {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}
