//! Unified error taxonomy for disclosure operations
//!
//! One error type covers the whole reveal pipeline so view state can carry a
//! failure reason verbatim and frontends can distinguish "cancelled" from
//! "unavailable" from generic failures. Per-effect errors (`LedgerError`,
//! `SignerError`, `RelayError`) are converted into this type at the
//! application layer.

use serde::{Deserialize, Serialize};

/// Error for disclosure and inventory operations
///
/// Every variant is recoverable: per-item failures stay local to that item's
/// state, and retry is always available by calling `reveal` again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DisclosureError {
    /// A required capability (signer or relay client) is not configured
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Inventory load failed at the ledger transport
    #[error("inventory load failed: {0}")]
    LoadFailed(String),

    /// The owner declined to sign the authorization
    #[error("signature request cancelled by owner")]
    UserRejected,

    /// The signer is configured but could not produce a signature
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// The relay could not be reached
    #[error("relay unavailable: {0}")]
    RelayUnavailable(String),

    /// The relay answered with an error or an incomplete result
    #[error("relay rejected request: {0}")]
    RelayRejected(String),

    /// The relay did not answer within the bounded wait
    #[error("relay timed out after {timeout_ms}ms")]
    Timeout {
        /// Bounded wait that elapsed, in milliseconds
        timeout_ms: u64,
    },

    /// The result arrived after the owner or view context changed
    ///
    /// Discarded silently by the coordinator; never surfaced as a user
    /// error.
    #[error("stale context: result discarded")]
    StaleContext,

    /// The authorization envelope could not be built
    #[error("invalid scope set: {0}")]
    InvalidScope(String),

    /// The requested item is not in the loaded inventory
    #[error("item {0} is not in the loaded inventory")]
    UnknownItem(crate::types::ItemId),
}

impl DisclosureError {
    /// Create a capability error for a missing signer
    pub fn no_signer() -> Self {
        Self::CapabilityUnavailable("no signer configured; connect a wallet".into())
    }

    /// Create a capability error for a missing relay client
    pub fn no_relay() -> Self {
        Self::CapabilityUnavailable("no relay client configured".into())
    }

    /// Create a load error from a transport failure
    pub fn load_failed(reason: impl Into<String>) -> Self {
        Self::LoadFailed(reason.into())
    }

    /// Whether this failure represents the owner cancelling the signature
    ///
    /// Frontends render cancellation differently from service failures.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::UserRejected)
    }

    /// Whether the failed operation may be retried
    ///
    /// `StaleContext` is not retryable against the old context; everything
    /// else is.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::StaleContext)
    }
}

/// Standard result type for disclosure operations
pub type DisclosureResult<T> = std::result::Result<T, DisclosureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(DisclosureError::UserRejected.is_cancelled());
        assert!(!DisclosureError::no_signer().is_cancelled());
        assert!(!DisclosureError::RelayRejected("partial".into()).is_cancelled());
    }

    #[test]
    fn capability_messages_name_the_missing_piece() {
        let signer = DisclosureError::no_signer().to_string();
        let relay = DisclosureError::no_relay().to_string();
        assert!(signer.contains("signer"));
        assert!(relay.contains("relay"));
        assert_ne!(signer, relay);
    }

    #[test]
    fn stale_context_is_not_retryable() {
        assert!(!DisclosureError::StaleContext.is_retryable());
        assert!(DisclosureError::Timeout { timeout_ms: 30_000 }.is_retryable());
    }
}
