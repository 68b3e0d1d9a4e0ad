//! Time effects
//!
//! Validity windows start at "now"; routing "now" through an effect trait
//! keeps envelope construction deterministic under test.

use async_trait::async_trait;

/// Clock interface for validity-window computation
#[async_trait]
pub trait TimeEffects: Send + Sync {
    /// Current unix time in whole seconds
    async fn unix_now_secs(&self) -> u64;
}
