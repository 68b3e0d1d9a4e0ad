//! Relay effect handlers

mod memory;

pub use memory::{MemoryRelayHandler, RelayMode};
