//! Signer effect handlers

mod local;
mod scripted;

pub use local::LocalSignerHandler;
pub use scripted::{ScriptedSignerHandler, SignerScript};
