//! Fixed time handler for deterministic tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use veil_core::effects::TimeEffects;

/// Time handler that reports a configurable instant
///
/// Envelope validity windows start at "now"; pinning the clock makes the
/// signable message, and hence signatures, reproducible across runs.
#[derive(Debug, Clone)]
pub struct FixedTimeHandler {
    now_secs: Arc<AtomicU64>,
}

impl FixedTimeHandler {
    /// Create a handler pinned at `now_secs` unix seconds
    pub fn at(now_secs: u64) -> Self {
        Self {
            now_secs: Arc::new(AtomicU64::new(now_secs)),
        }
    }

    /// Move the pinned clock
    pub fn set(&self, now_secs: u64) {
        self.now_secs.store(now_secs, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeEffects for FixedTimeHandler {
    async fn unix_now_secs(&self) -> u64 {
        self.now_secs.load(Ordering::SeqCst)
    }
}
