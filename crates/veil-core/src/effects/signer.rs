//! Owner signing effects
//!
//! The signer is an external capability (typically a wallet). Signing may
//! prompt the owner interactively, so a call can take arbitrarily long and
//! must never be awaited while holding inventory state locks.

use crate::envelope::TypedAuthorizationMessage;
use crate::types::OwnerAddress;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Signing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SignerError {
    /// The signer is not able to sign right now
    #[error("signer unavailable: {reason}")]
    Unavailable {
        /// Reason for the failure
        reason: String,
    },
    /// The owner declined the signature prompt
    #[error("owner rejected the signature request")]
    Rejected,
}

/// Signs structured authorization messages on behalf of the owner
#[async_trait]
pub trait SignerEffects: Send + Sync {
    /// The address signatures are attributed to
    async fn address(&self) -> Result<OwnerAddress, SignerError>;

    /// Sign the canonical bytes of a typed authorization message
    ///
    /// Returns the signature hex-encoded; a `0x` prefix is tolerated and
    /// stripped downstream.
    async fn sign_authorization(
        &self,
        message: &TypedAuthorizationMessage,
    ) -> Result<String, SignerError>;
}
