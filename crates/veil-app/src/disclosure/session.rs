//! One disclosure session, end to end
//!
//! A session converts an item's two ciphertext handles into plaintexts:
//! fresh keypair, envelope scoped to the item's token contract, one owner
//! signature, one batched relay round trip. All session material lives on
//! this stack frame; nothing is cached for a later attempt, and the
//! ephemeral private key is zeroized when the session ends, whatever the
//! outcome.

use crate::disclosure::client::DisclosureClient;
use std::sync::Arc;
use veil_core::effects::{SessionKeyEffects, SignerEffects, SignerError, TimeEffects};
use veil_core::{
    AuthorizationEnvelope, CiphertextHandle, DisclosureError, DisclosureResult, HandleScopePair,
    ItemId, RelayDecryptRequest, ScopeAddress, SignedAuthorization, SigningDomain,
};

/// Typed per-item context a session operates on
///
/// Snapshot of the item's handles and scope taken under the state lock when
/// the session starts; carried explicitly through the pipeline instead of
/// being stashed on the item record across await points.
#[derive(Debug, Clone)]
pub struct ItemDisclosureContext {
    /// Item being disclosed
    pub item_id: ItemId,
    /// Handle of the encrypted attack attribute
    pub attack_handle: CiphertextHandle,
    /// Handle of the encrypted defense attribute
    pub defense_handle: CiphertextHandle,
    /// Token contract both handles belong to
    pub scope: ScopeAddress,
}

/// Plaintext attributes produced by a successful session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosedAttributes {
    /// Revealed attack value
    pub attack: u64,
    /// Revealed defense value
    pub defense: u64,
}

/// Run one disclosure session for one item
///
/// The signing prompt and the relay round trip are both long-latency
/// suspensions; the caller must not hold inventory locks across this call.
pub(crate) async fn run(
    keys: &Arc<dyn SessionKeyEffects>,
    time: &Arc<dyn TimeEffects>,
    signer: &Arc<dyn SignerEffects>,
    client: &DisclosureClient,
    domain: &SigningDomain,
    validity_days: u32,
    ctx: &ItemDisclosureContext,
) -> DisclosureResult<DisclosedAttributes> {
    let keypair = keys.generate_keypair().await;
    let valid_from = time.unix_now_secs().await;

    let envelope = AuthorizationEnvelope::build(
        keypair.public_key(),
        vec![ctx.scope.clone()],
        valid_from,
        validity_days,
    )
    .map_err(|e| DisclosureError::InvalidScope(e.to_string()))?;

    let message = envelope.typed_message(domain);
    let signer_address = signer.address().await.map_err(map_signer_error)?;
    tracing::debug!(item = %ctx.item_id, "requesting authorization signature");
    let signature = signer
        .sign_authorization(&message)
        .await
        .map_err(map_signer_error)?;
    let auth = SignedAuthorization::new(envelope, signature, signer_address);

    // Both attributes under the one authorization: a single prompt per
    // item, and the relay answers for both handles or the batch fails.
    let request = RelayDecryptRequest::from_session(
        vec![
            HandleScopePair::new(ctx.attack_handle.clone(), ctx.scope.clone()),
            HandleScopePair::new(ctx.defense_handle.clone(), ctx.scope.clone()),
        ],
        &keypair,
        &auth,
    );

    let plaintexts = client.disclose(&request).await?;
    let attack = *plaintexts
        .get(&ctx.attack_handle)
        .ok_or_else(|| DisclosureError::RelayRejected("attack handle missing".into()))?;
    let defense = *plaintexts
        .get(&ctx.defense_handle)
        .ok_or_else(|| DisclosureError::RelayRejected("defense handle missing".into()))?;

    Ok(DisclosedAttributes { attack, defense })
}

fn map_signer_error(error: SignerError) -> DisclosureError {
    match error {
        SignerError::Rejected => DisclosureError::UserRejected,
        SignerError::Unavailable { reason } => DisclosureError::SignerUnavailable(reason),
    }
}
