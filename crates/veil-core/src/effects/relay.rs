//! Decryption relay effects
//!
//! The relay holds the decryption capability and is consumed as an opaque
//! oracle: untrusted as transport, trusted for the plaintexts it returns.
//! Completeness validation and bounded waits are the application layer's
//! job (`veil-app`'s disclosure client), not the handler's.

use crate::envelope::RelayDecryptRequest;
use crate::types::CiphertextHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relay transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum RelayError {
    /// The relay could not be reached
    #[error("relay unreachable: {reason}")]
    Unavailable {
        /// Reason for the failure
        reason: String,
    },
    /// The relay refused the request
    #[error("relay rejected request: {reason}")]
    Rejected {
        /// Reason given by the relay
        reason: String,
    },
}

/// One-shot decryption RPC against the relay
///
/// The returned map is keyed by the exact handles requested; values are the
/// plaintext integers as decimal strings in the relay's native precision.
/// A handler may legitimately return a partial map; callers must validate
/// completeness before using any of it.
#[async_trait]
pub trait RelayEffects: Send + Sync {
    /// Decrypt a batch of handles under one signed authorization
    async fn user_decrypt(
        &self,
        request: &RelayDecryptRequest,
    ) -> Result<HashMap<CiphertextHandle, String>, RelayError>;
}
