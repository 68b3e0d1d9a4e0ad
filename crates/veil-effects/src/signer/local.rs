//! Local Ed25519 signer handler
//!
//! Signs authorization messages with a device-held Ed25519 key. Production
//! deployments front a wallet instead; this handler covers embedded and
//! simulation use where the owner key lives in-process.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use veil_core::effects::{SignerEffects, SignerError};
use veil_core::{OwnerAddress, TypedAuthorizationMessage};

/// Signer handler backed by an in-process Ed25519 key
#[derive(Clone)]
pub struct LocalSignerHandler {
    signing_key: SigningKey,
    address: OwnerAddress,
}

impl std::fmt::Debug for LocalSignerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSignerHandler")
            .field("address", &self.address)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl LocalSignerHandler {
    /// Create a handler around an existing signing key
    pub fn new(signing_key: SigningKey) -> Self {
        let address = OwnerAddress::new(format!(
            "0x{}",
            hex::encode(signing_key.verifying_key().as_bytes())
        ));
        Self {
            signing_key,
            address,
        }
    }

    /// Generate a fresh random signer
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    /// Verifying key matching this signer's address
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

#[async_trait]
impl SignerEffects for LocalSignerHandler {
    async fn address(&self) -> Result<OwnerAddress, SignerError> {
        Ok(self.address.clone())
    }

    async fn sign_authorization(
        &self,
        message: &TypedAuthorizationMessage,
    ) -> Result<String, SignerError> {
        let payload = message
            .signing_payload()
            .map_err(|e| SignerError::Unavailable {
                reason: e.to_string(),
            })?;
        let signature = self.signing_key.sign(&payload);
        Ok(hex::encode(signature.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;
    use veil_core::{AuthorizationEnvelope, ScopeAddress, SigningDomain};

    fn message() -> TypedAuthorizationMessage {
        let envelope = AuthorizationEnvelope::build(
            "aabb",
            vec![ScopeAddress::new("0xc0ffee")],
            1_700_000_000,
            10,
        )
        .unwrap();
        let domain = SigningDomain::new("Veil", "1", 11155111, ScopeAddress::new("0xc0ffee"));
        envelope.typed_message(&domain)
    }

    #[tokio::test]
    async fn signature_verifies_against_canonical_payload() {
        let signer = LocalSignerHandler::generate();
        let msg = message();
        let signature_hex = signer.sign_authorization(&msg).await.unwrap();

        let bytes = hex::decode(signature_hex).unwrap();
        let signature = ed25519_dalek::Signature::from_slice(&bytes).unwrap();
        let payload = msg.signing_payload().unwrap();
        signer
            .verifying_key()
            .verify(&payload, &signature)
            .expect("signature must verify over the canonical bytes");
    }

    #[tokio::test]
    async fn address_is_stable_and_hex() {
        let signer = LocalSignerHandler::generate();
        let addr = signer.address().await.unwrap();
        assert!(addr.as_str().starts_with("0x"));
        assert_eq!(addr, signer.address().await.unwrap());
    }
}
