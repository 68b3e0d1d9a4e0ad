//! Session key generation from OS randomness

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use veil_core::effects::SessionKeyEffects;
use veil_core::EphemeralKeypair;

/// Generates hex-encoded 32-byte session keypairs from the OS RNG
///
/// The relay treats the key material as opaque re-encryption keys, so the
/// handler only guarantees freshness and length, not a particular curve.
#[derive(Debug, Clone, Default)]
pub struct OsRngKeyHandler;

impl OsRngKeyHandler {
    /// Create a new key handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionKeyEffects for OsRngKeyHandler {
    async fn generate_keypair(&self) -> EphemeralKeypair {
        let mut public = [0u8; 32];
        let mut private = [0u8; 32];
        OsRng.fill_bytes(&mut public);
        OsRng.fill_bytes(&mut private);
        EphemeralKeypair::from_parts(hex::encode(public), hex::encode(private))
    }
}
