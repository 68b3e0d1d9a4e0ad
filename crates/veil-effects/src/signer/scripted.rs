//! Scripted signer handler for tests
//!
//! Plays back a configured response per prompt and counts how many prompts
//! were issued, which is what the one-prompt-per-reveal tests assert on.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use veil_core::effects::{SignerEffects, SignerError};
use veil_core::{OwnerAddress, TypedAuthorizationMessage};

/// What the scripted signer does when prompted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerScript {
    /// Return a signature derived from the prompt counter
    Sign,
    /// Decline the prompt
    Reject,
    /// Fail as unavailable
    Unavailable,
}

/// Signer handler with scripted behavior
#[derive(Debug, Clone)]
pub struct ScriptedSignerHandler {
    address: OwnerAddress,
    script: Arc<Mutex<SignerScript>>,
    prompts: Arc<AtomicUsize>,
}

impl ScriptedSignerHandler {
    /// Create a signer for `address` with the given initial script
    pub fn new(address: OwnerAddress, script: SignerScript) -> Self {
        Self {
            address,
            script: Arc::new(Mutex::new(script)),
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Signer that approves every prompt
    pub fn approving(address: OwnerAddress) -> Self {
        Self::new(address, SignerScript::Sign)
    }

    /// Change the scripted behavior for subsequent prompts
    pub fn set_script(&self, script: SignerScript) {
        if let Ok(mut current) = self.script.lock() {
            *current = script;
        }
    }

    /// Number of signature prompts issued so far
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignerEffects for ScriptedSignerHandler {
    async fn address(&self) -> Result<OwnerAddress, SignerError> {
        Ok(self.address.clone())
    }

    async fn sign_authorization(
        &self,
        _message: &TypedAuthorizationMessage,
    ) -> Result<String, SignerError> {
        let prompt = self.prompts.fetch_add(1, Ordering::SeqCst) + 1;
        let script = self
            .script
            .lock()
            .map(|s| s.clone())
            .unwrap_or(SignerScript::Unavailable);
        match script {
            // Counter-derived so each session's signature is distinct.
            SignerScript::Sign => Ok(format!("{:064x}", prompt)),
            SignerScript::Reject => Err(SignerError::Rejected),
            SignerScript::Unavailable => Err(SignerError::Unavailable {
                reason: "scripted outage".into(),
            }),
        }
    }
}
