//! Authorization envelopes for encrypted-attribute disclosure
//!
//! A disclosure session binds a fresh ephemeral keypair to a set of contract
//! scopes and a validity window, gets the owner's signature over that
//! binding, and hands the whole package to the relay. The envelope's wire
//! encoding is a structured message with named fields; the relay verifies
//! the signature against the same canonical bytes, so the encoding here is
//! stability-critical: field names and field order are the wire format.

use crate::types::{CiphertextHandle, OwnerAddress, ScopeAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Primary type name of the signable authorization message
pub const AUTHORIZATION_PRIMARY_TYPE: &str = "UserDecryptRequestVerification";

/// Error constructing or encoding an authorization envelope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The authorized scope set was empty
    #[error("authorized scope set is empty")]
    EmptyScopes,
    /// The validity window duration was zero days
    #[error("validity duration must be at least one day")]
    ZeroDuration,
    /// Canonical encoding of the signable message failed
    #[error("envelope encoding failed: {0}")]
    Encoding(String),
}

/// Ephemeral keypair generated fresh for one disclosure session
///
/// The relay encrypts plaintexts to the public half; the private half
/// decrypts the response client-side. Neither half is ever persisted or
/// reused: the pair lives on the session's stack frame and the private key
/// is zeroized on drop. The type deliberately implements neither
/// `Serialize` nor `Deserialize`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EphemeralKeypair {
    #[zeroize(skip)]
    public_key: String,
    private_key: String,
}

impl EphemeralKeypair {
    /// Assemble a keypair from hex-encoded halves
    pub fn from_parts(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Hex-encoded public key
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Hex-encoded private key
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Domain descriptor for structured signing
///
/// Pins the signature to one deployment: a relay for a different chain or
/// contract produces different canonical bytes and the signature will not
/// verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Human-readable protocol name
    pub name: String,
    /// Protocol version string
    pub version: String,
    /// Chain the verifying contract lives on
    pub chain_id: u64,
    /// Contract that verifies disclosure authorizations
    pub verifying_contract: ScopeAddress,
}

impl SigningDomain {
    /// Create a signing domain
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: ScopeAddress,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }
}

/// What a disclosure session is authorized to do, and for how long
///
/// Authorizes disclosure only for handles whose owning scope appears in
/// `authorized_scopes`, and only within
/// `[valid_from, valid_from + valid_duration_days)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationEnvelope {
    /// Ephemeral public key the relay encrypts plaintexts to
    pub public_key: String,
    /// Contract scopes this authorization covers (non-empty, deduplicated)
    pub authorized_scopes: Vec<ScopeAddress>,
    /// Window start, unix seconds
    pub valid_from: u64,
    /// Window length in whole days, always positive
    pub valid_duration_days: u32,
}

impl AuthorizationEnvelope {
    /// Build an envelope, validating the scope set and window
    ///
    /// Deterministic and side-effect free. Duplicate scopes are collapsed,
    /// keeping first occurrence so the signable message stays stable for a
    /// given input order.
    pub fn build(
        public_key: impl Into<String>,
        scopes: Vec<ScopeAddress>,
        valid_from: u64,
        valid_duration_days: u32,
    ) -> Result<Self, EnvelopeError> {
        if scopes.is_empty() {
            return Err(EnvelopeError::EmptyScopes);
        }
        if valid_duration_days == 0 {
            return Err(EnvelopeError::ZeroDuration);
        }
        let mut authorized_scopes: Vec<ScopeAddress> = Vec::with_capacity(scopes.len());
        for scope in scopes {
            if !authorized_scopes.contains(&scope) {
                authorized_scopes.push(scope);
            }
        }
        Ok(Self {
            public_key: public_key.into(),
            authorized_scopes,
            valid_from,
            valid_duration_days,
        })
    }

    /// Whether `scope` is covered by this envelope
    pub fn covers(&self, scope: &ScopeAddress) -> bool {
        self.authorized_scopes.contains(scope)
    }

    /// The structured message the owner signs
    pub fn typed_message(&self, domain: &SigningDomain) -> TypedAuthorizationMessage {
        TypedAuthorizationMessage {
            domain: domain.clone(),
            primary_type: AUTHORIZATION_PRIMARY_TYPE.to_string(),
            message: self.clone(),
        }
    }
}

/// Structured, signable description of a disclosure authorization
///
/// A domain descriptor plus one typed field set. The canonical bytes are
/// the JSON encoding with fields in declaration order; the relay verifier
/// reproduces the same bytes independently, so any drift here invalidates
/// every outstanding signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedAuthorizationMessage {
    /// Domain descriptor
    pub domain: SigningDomain,
    /// Name of the typed field set
    pub primary_type: String,
    /// The envelope fields being authorized
    pub message: AuthorizationEnvelope,
}

impl TypedAuthorizationMessage {
    /// Canonical bytes to sign
    pub fn signing_payload(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }
}

/// An envelope together with the owner's signature over it
///
/// Produced once per disclosure session and never reused across sessions.
/// The signature is stored hex-encoded without a `0x` prefix, which is the
/// form the relay wire format expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization {
    /// The authorized envelope
    pub envelope: AuthorizationEnvelope,
    signature: String,
    /// Address of the signing owner
    pub signer: OwnerAddress,
}

impl SignedAuthorization {
    /// Attach a signature to an envelope, normalizing away any `0x` prefix
    pub fn new(
        envelope: AuthorizationEnvelope,
        signature: impl Into<String>,
        signer: OwnerAddress,
    ) -> Self {
        let signature = signature.into();
        let signature = signature
            .strip_prefix("0x")
            .map(str::to_string)
            .unwrap_or(signature);
        Self {
            envelope,
            signature,
            signer,
        }
    }

    /// Hex signature without a `0x` prefix
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// One `(handle, scope)` pair in a disclosure batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleScopePair {
    /// Ciphertext handle to decrypt
    pub handle: CiphertextHandle,
    /// Contract scope the handle belongs to
    pub scope: ScopeAddress,
}

impl HandleScopePair {
    /// Create a pair
    pub fn new(handle: CiphertextHandle, scope: ScopeAddress) -> Self {
        Self { handle, scope }
    }
}

/// Typed request context for one relay round trip
///
/// Carries everything the relay needs through the pipeline explicitly,
/// instead of stashing temporary fields on the item across await points.
/// All pairs in one request are authorized under the same signed envelope;
/// batches are never split across authorizations.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayDecryptRequest {
    /// Ordered `(handle, scope)` pairs to decrypt
    pub pairs: Vec<HandleScopePair>,
    /// Ephemeral public key from the session keypair
    pub public_key: String,
    /// Ephemeral private key from the session keypair
    pub private_key: String,
    /// Owner signature, hex without `0x` prefix
    pub signature: String,
    /// Scopes the signed envelope authorizes
    pub authorized_scopes: Vec<ScopeAddress>,
    /// Address of the requesting owner
    pub requester: OwnerAddress,
    /// Window start, unix seconds, string-encoded per the relay wire format
    pub valid_from: String,
    /// Window length in days, string-encoded per the relay wire format
    pub duration_days: String,
}

impl RelayDecryptRequest {
    /// Assemble a request from session material
    pub fn from_session(
        pairs: Vec<HandleScopePair>,
        keypair: &EphemeralKeypair,
        auth: &SignedAuthorization,
    ) -> Self {
        Self {
            pairs,
            public_key: keypair.public_key().to_string(),
            private_key: keypair.private_key().to_string(),
            signature: auth.signature().to_string(),
            authorized_scopes: auth.envelope.authorized_scopes.clone(),
            requester: auth.signer.clone(),
            valid_from: auth.envelope.valid_from.to_string(),
            duration_days: auth.envelope.valid_duration_days.to_string(),
        }
    }

    /// The handles this request asks the relay to decrypt, in order
    pub fn handles(&self) -> impl Iterator<Item = &CiphertextHandle> {
        self.pairs.iter().map(|pair| &pair.handle)
    }
}

impl fmt::Debug for RelayDecryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayDecryptRequest")
            .field("pairs", &self.pairs)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("signature", &self.signature)
            .field("authorized_scopes", &self.authorized_scopes)
            .field("requester", &self.requester)
            .field("valid_from", &self.valid_from)
            .field("duration_days", &self.duration_days)
            .finish()
    }
}
