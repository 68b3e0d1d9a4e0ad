//! Session key generation effects

use crate::envelope::EphemeralKeypair;
use async_trait::async_trait;

/// Generates ephemeral keypairs for disclosure sessions
///
/// Every call must return a fresh pair; handlers are the only source of
/// session key material, which makes "never reused" observable in tests.
#[async_trait]
pub trait SessionKeyEffects: Send + Sync {
    /// Generate a fresh ephemeral keypair
    async fn generate_keypair(&self) -> EphemeralKeypair;
}
