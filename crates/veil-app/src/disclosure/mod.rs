//! Disclosure pipeline: client, per-item session

pub mod client;
pub mod session;

pub use client::DisclosureClient;
pub use session::{DisclosedAttributes, ItemDisclosureContext};
