//! In-memory relay handler
//!
//! Stands in for the decryption relay: holds a plaintext table and answers
//! `user_decrypt` after enforcing the same authorization rules a production
//! relay enforces (scope membership, unprefixed signature, well-formed
//! validity window). Response modes simulate partial results, outages, and
//! slow round trips; the handler also records enough history for tests to
//! assert that session material is never reused and that no duplicate
//! requests are issued.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use veil_core::effects::{RelayEffects, RelayError};
use veil_core::{CiphertextHandle, RelayDecryptRequest};

/// How the handler answers the next requests
#[derive(Debug, Clone, Default)]
pub enum RelayMode {
    /// Answer every known handle
    #[default]
    Normal,
    /// Answer but leave the listed handles out of the map
    OmitHandles(Vec<CiphertextHandle>),
    /// Fail as unreachable
    Unavailable,
}

/// In-memory relay handler
#[derive(Debug, Clone, Default)]
pub struct MemoryRelayHandler {
    plaintexts: Arc<Mutex<HashMap<CiphertextHandle, u64>>>,
    mode: Arc<Mutex<RelayMode>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
    calls: Arc<AtomicUsize>,
    seen_public_keys: Arc<Mutex<Vec<String>>>,
    seen_signatures: Arc<Mutex<Vec<String>>>,
}

impl MemoryRelayHandler {
    /// Create an empty relay
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the plaintext behind a handle
    pub fn insert_plaintext(&self, handle: CiphertextHandle, value: u64) {
        if let Ok(mut table) = self.plaintexts.lock() {
            table.insert(handle, value);
        }
    }

    /// Change the response mode for subsequent requests
    pub fn set_mode(&self, mode: RelayMode) {
        if let Ok(mut current) = self.mode.lock() {
            *current = mode;
        }
    }

    /// Hold subsequent requests until [`Self::release`] is called
    ///
    /// Each held request consumes one release. Releasing before the request
    /// arrives is fine; the permit is stored.
    pub fn hold_responses(&self) {
        if let Ok(mut gate) = self.gate.lock() {
            *gate = Some(Arc::new(Notify::new()));
        }
    }

    /// Release one held request
    pub fn release(&self) {
        if let Ok(gate) = self.gate.lock() {
            if let Some(notify) = gate.as_ref() {
                notify.notify_one();
            }
        }
    }

    /// Stop holding requests (already-held requests still need a release)
    pub fn unhold(&self) {
        if let Ok(mut gate) = self.gate.lock() {
            *gate = None;
        }
    }

    /// Number of `user_decrypt` calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Ephemeral public keys observed across all requests
    pub fn seen_public_keys(&self) -> Vec<String> {
        self.seen_public_keys
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }

    /// Signatures observed across all requests
    pub fn seen_signatures(&self) -> Vec<String> {
        self.seen_signatures
            .lock()
            .map(|sigs| sigs.clone())
            .unwrap_or_default()
    }

    /// Reject requests that a production relay would refuse
    fn validate(request: &RelayDecryptRequest) -> Result<(), RelayError> {
        if request.pairs.is_empty() {
            return Err(RelayError::Rejected {
                reason: "empty handle batch".into(),
            });
        }
        if request.authorized_scopes.is_empty() {
            return Err(RelayError::Rejected {
                reason: "empty scope authorization".into(),
            });
        }
        for pair in &request.pairs {
            if !request.authorized_scopes.contains(&pair.scope) {
                return Err(RelayError::Rejected {
                    reason: format!("scope {} not authorized", pair.scope),
                });
            }
        }
        if request.signature.is_empty() || request.signature.starts_with("0x") {
            return Err(RelayError::Rejected {
                reason: "signature must be unprefixed hex".into(),
            });
        }
        let valid_from: u64 = request.valid_from.parse().map_err(|_| RelayError::Rejected {
            reason: "malformed validity window start".into(),
        })?;
        let duration_days: u32 =
            request
                .duration_days
                .parse()
                .map_err(|_| RelayError::Rejected {
                    reason: "malformed validity window duration".into(),
                })?;
        if valid_from == 0 || duration_days == 0 {
            return Err(RelayError::Rejected {
                reason: "degenerate validity window".into(),
            });
        }
        Ok(())
    }

    fn record(&self, request: &RelayDecryptRequest) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(call, batch = request.pairs.len(), "relay request received");
        if let Ok(mut keys) = self.seen_public_keys.lock() {
            keys.push(request.public_key.clone());
        }
        if let Ok(mut sigs) = self.seen_signatures.lock() {
            sigs.push(request.signature.clone());
        }
    }

    fn current_gate(&self) -> Option<Arc<Notify>> {
        self.gate.lock().ok().and_then(|gate| gate.clone())
    }
}

#[async_trait]
impl RelayEffects for MemoryRelayHandler {
    async fn user_decrypt(
        &self,
        request: &RelayDecryptRequest,
    ) -> Result<HashMap<CiphertextHandle, String>, RelayError> {
        self.record(request);

        if let Some(gate) = self.current_gate() {
            gate.notified().await;
        }

        let mode = self
            .mode
            .lock()
            .map(|m| m.clone())
            .unwrap_or(RelayMode::Normal);
        if matches!(mode, RelayMode::Unavailable) {
            return Err(RelayError::Unavailable {
                reason: "simulated relay outage".into(),
            });
        }

        Self::validate(request)?;

        let table = self.plaintexts.lock().map_err(|_| RelayError::Unavailable {
            reason: "plaintext table poisoned".into(),
        })?;
        let omitted: &[CiphertextHandle] = match &mode {
            RelayMode::OmitHandles(handles) => handles,
            _ => &[],
        };
        let mut result = HashMap::new();
        for pair in &request.pairs {
            if omitted.contains(&pair.handle) {
                continue;
            }
            if let Some(value) = table.get(&pair.handle) {
                result.insert(pair.handle.clone(), value.to_string());
            }
        }
        Ok(result)
    }
}
