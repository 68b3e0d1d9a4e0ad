//! Disclosure client: one authorized batch, one bounded round trip
//!
//! Wraps the relay effect with the client-side rules the relay itself does
//! not enforce: a bounded wait, completeness validation of the returned
//! map, and exact-integer parsing of the plaintexts. The relay is untrusted
//! as transport; a partial or malformed answer fails the whole batch so an
//! item's attributes are revealed atomically or not at all.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use veil_core::effects::{RelayEffects, RelayError};
use veil_core::{CiphertextHandle, DisclosureError, DisclosureResult, RelayDecryptRequest};

/// Client for the relay's batched decryption RPC
#[derive(Clone)]
pub struct DisclosureClient {
    relay: Arc<dyn RelayEffects>,
    timeout: Duration,
}

impl DisclosureClient {
    /// Create a client over a relay handler with a bounded per-call wait
    pub fn new(relay: Arc<dyn RelayEffects>, timeout: Duration) -> Self {
        Self { relay, timeout }
    }

    /// Decrypt a batch of handles under one signed authorization
    ///
    /// All pairs in the request share the single authorization it carries;
    /// the client never splits a batch. On success the returned map holds a
    /// plaintext for every requested handle, parsed as an exact integer.
    pub async fn disclose(
        &self,
        request: &RelayDecryptRequest,
    ) -> DisclosureResult<BTreeMap<CiphertextHandle, u64>> {
        let raw = match tokio::time::timeout(self.timeout, self.relay.user_decrypt(request)).await
        {
            Ok(result) => result.map_err(|e| match e {
                RelayError::Unavailable { reason } => DisclosureError::RelayUnavailable(reason),
                RelayError::Rejected { reason } => DisclosureError::RelayRejected(reason),
            })?,
            Err(_) => {
                return Err(DisclosureError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        let mut plaintexts = BTreeMap::new();
        for handle in request.handles() {
            let value = raw.get(handle).ok_or_else(|| {
                DisclosureError::RelayRejected(format!("incomplete result: missing {handle}"))
            })?;
            // Decimal string to integer; the value never touches floats.
            let parsed: u64 = value.parse().map_err(|_| {
                DisclosureError::RelayRejected(format!("non-integer plaintext for {handle}"))
            })?;
            plaintexts.insert(handle.clone(), parsed);
        }
        Ok(plaintexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use veil_core::{
        AuthorizationEnvelope, EphemeralKeypair, HandleScopePair, OwnerAddress, ScopeAddress,
        SignedAuthorization,
    };
    use veil_effects::{MemoryRelayHandler, RelayMode};

    fn request(handles: &[&str]) -> RelayDecryptRequest {
        let scope = ScopeAddress::new("0x01");
        let envelope =
            AuthorizationEnvelope::build("pk", vec![scope.clone()], 1_700_000_000, 10).unwrap();
        let auth = SignedAuthorization::new(envelope, "abc123", OwnerAddress::new("0xme"));
        let pairs = handles
            .iter()
            .map(|h| HandleScopePair::new(CiphertextHandle::new(*h), scope.clone()))
            .collect();
        RelayDecryptRequest::from_session(pairs, &EphemeralKeypair::from_parts("pk", "sk"), &auth)
    }

    fn relay_with(values: &[(&str, u64)]) -> Arc<MemoryRelayHandler> {
        let relay = Arc::new(MemoryRelayHandler::new());
        for (handle, value) in values {
            relay.insert_plaintext(CiphertextHandle::new(*handle), *value);
        }
        relay
    }

    #[tokio::test]
    async fn parses_complete_result_exactly() {
        let relay = relay_with(&[("0xaa", 42), ("0xbb", 37)]);
        let client = DisclosureClient::new(relay, Duration::from_secs(30));
        let result = client.disclose(&request(&["0xaa", "0xbb"])).await.unwrap();
        assert_eq!(result[&CiphertextHandle::new("0xaa")], 42);
        assert_eq!(result[&CiphertextHandle::new("0xbb")], 37);
    }

    #[tokio::test]
    async fn partial_result_fails_the_whole_batch() {
        let relay = relay_with(&[("0xaa", 42), ("0xbb", 37)]);
        relay.set_mode(RelayMode::OmitHandles(vec![CiphertextHandle::new("0xbb")]));
        let client = DisclosureClient::new(relay, Duration::from_secs(30));
        let err = client
            .disclose(&request(&["0xaa", "0xbb"]))
            .await
            .unwrap_err();
        assert_matches!(err, DisclosureError::RelayRejected(reason) if reason.contains("0xbb"));
    }

    #[tokio::test]
    async fn outage_maps_to_relay_unavailable() {
        let relay = relay_with(&[("0xaa", 42)]);
        relay.set_mode(RelayMode::Unavailable);
        let client = DisclosureClient::new(relay, Duration::from_secs(30));
        assert_matches!(
            client.disclose(&request(&["0xaa"])).await,
            Err(DisclosureError::RelayUnavailable(_))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_relay_hits_the_bounded_wait() {
        let relay = relay_with(&[("0xaa", 42)]);
        relay.hold_responses();
        let client = DisclosureClient::new(relay, Duration::from_millis(250));
        let err = client.disclose(&request(&["0xaa"])).await.unwrap_err();
        assert_eq!(err, DisclosureError::Timeout { timeout_ms: 250 });
    }

    #[tokio::test]
    async fn values_larger_than_u32_stay_exact() {
        // 2^53 + 1 is where f64 starts losing integers; the pipeline must not.
        let relay = relay_with(&[("0xaa", 9_007_199_254_740_993)]);
        let client = DisclosureClient::new(relay, Duration::from_secs(30));
        let result = client.disclose(&request(&["0xaa"])).await.unwrap();
        assert_eq!(result[&CiphertextHandle::new("0xaa")], 9_007_199_254_740_993);
    }
}
