//! Real time handler for production use

use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use veil_core::effects::TimeEffects;

/// System-clock time handler
#[derive(Debug, Clone, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeEffects for RealTimeHandler {
    async fn unix_now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}
