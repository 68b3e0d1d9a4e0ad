//! Ledger effect handlers

mod memory;

pub use memory::{MemoryLedgerHandler, MintedItem};
