//! End-to-end disclosure flow tests
//!
//! Drives the coordinator against the in-memory effect handlers: load,
//! reveal, duplicate suppression, per-item failure isolation, and stale
//! result discarding after disconnect.

use assert_matches::assert_matches;
use std::sync::Arc;
use veil_app::{
    DisclosurePolicy, InventoryCoordinator, InventoryPhase, RevealOutcome,
};
use veil_core::{
    CiphertextHandle, DisclosureError, DisclosureStatus, ItemId, OwnerAddress, Rarity,
    ScopeAddress, SigningDomain,
};
use veil_effects::{
    FixedTimeHandler, MemoryLedgerHandler, MemoryRelayHandler, MintedItem, OsRngKeyHandler,
    RelayMode, ScriptedSignerHandler, SignerScript,
};

const OWNER: &str = "0xalice";
const CONTRACT: &str = "0xc0ffee";

struct Fixture {
    coordinator: InventoryCoordinator,
    ledger: Arc<MemoryLedgerHandler>,
    relay: Arc<MemoryRelayHandler>,
    signer: Arc<ScriptedSignerHandler>,
}

fn policy() -> DisclosurePolicy {
    let contract = ScopeAddress::new(CONTRACT);
    let domain = SigningDomain::new("Veil", "1", 11155111, contract.clone());
    DisclosurePolicy::new(contract, domain)
}

fn fixture() -> Fixture {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let ledger = Arc::new(MemoryLedgerHandler::new());
    let relay = Arc::new(MemoryRelayHandler::new());
    let signer = Arc::new(ScriptedSignerHandler::approving(OwnerAddress::new(OWNER)));
    let coordinator = InventoryCoordinator::new(
        ledger.clone(),
        Arc::new(OsRngKeyHandler::new()),
        Arc::new(FixedTimeHandler::at(1_700_000_000)),
        policy(),
    )
    .with_signer(signer.clone())
    .with_relay(relay.clone());
    Fixture {
        coordinator,
        ledger,
        relay,
        signer,
    }
}

fn mint(fx: &Fixture, id: u64, attack_handle: &str, defense_handle: &str) {
    fx.ledger.mint(
        ItemId::new(id),
        MintedItem {
            owner: OwnerAddress::new(OWNER),
            rarity: Rarity::Rare,
            attack_handle: CiphertextHandle::new(attack_handle),
            defense_handle: CiphertextHandle::new(defense_handle),
        },
    );
}

/// Fixture with item #1 minted and its plaintexts known to the relay.
async fn loaded_fixture() -> Fixture {
    let fx = fixture();
    mint(&fx, 1, "0xaa", "0xbb");
    fx.relay.insert_plaintext(CiphertextHandle::new("0xaa"), 42);
    fx.relay.insert_plaintext(CiphertextHandle::new("0xbb"), 37);
    fx.coordinator
        .load(OwnerAddress::new(OWNER))
        .await
        .unwrap();
    fx
}

async fn wait_for_relay_call(relay: &MemoryRelayHandler, count: usize) {
    while relay.call_count() < count {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_ledger_read(ledger: &MemoryLedgerHandler, count: usize) {
    while ledger.read_count() < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn load_populates_locked_items() {
    let fx = loaded_fixture().await;
    let items = fx.coordinator.items().await;
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.id, ItemId::new(1));
    assert_eq!(item.rarity, Rarity::Rare);
    assert_eq!(item.attack, None);
    assert_eq!(item.defense, None);
    assert_eq!(item.status, DisclosureStatus::Locked);

    let state = fx.coordinator.state().await;
    assert_eq!(state.phase(), &InventoryPhase::Ready);
    assert_eq!(state.revealed_count(), 0);
    assert_eq!(state.locked_count(), 1);
}

#[tokio::test]
async fn reveal_discloses_both_attributes() {
    let fx = loaded_fixture().await;
    let outcome = fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    assert_eq!(
        outcome,
        RevealOutcome::Revealed {
            attack: 42,
            defense: 37
        }
    );

    let item = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    assert_eq!(item.attack, Some(42));
    assert_eq!(item.defense, Some(37));
    assert_eq!(item.status, DisclosureStatus::Revealed);

    assert_eq!(fx.signer.prompt_count(), 1);
    assert_eq!(fx.relay.call_count(), 1);
}

#[tokio::test]
async fn reveal_while_in_flight_is_a_noop() {
    let fx = loaded_fixture().await;
    fx.relay.hold_responses();

    let background = fx.coordinator.clone();
    let task = tokio::spawn(async move { background.reveal(ItemId::new(1)).await });
    wait_for_relay_call(&fx.relay, 1).await;

    // Rapid repeated invocation while the first session is suspended at the
    // relay: no second prompt, no second relay call.
    let outcome = fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    assert_eq!(outcome, RevealOutcome::AlreadyInFlight);
    let outcome = fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    assert_eq!(outcome, RevealOutcome::AlreadyInFlight);
    assert_eq!(fx.signer.prompt_count(), 1);
    assert_eq!(fx.relay.call_count(), 1);

    fx.relay.release();
    let outcome = task.await.unwrap().unwrap();
    assert_matches!(outcome, RevealOutcome::Revealed { .. });

    // Revealed is terminal: a further reveal starts nothing.
    let outcome = fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    assert_eq!(outcome, RevealOutcome::AlreadyRevealed);
    assert_eq!(fx.signer.prompt_count(), 1);
    assert_eq!(fx.relay.call_count(), 1);
}

#[tokio::test]
async fn rejected_signature_is_cancelled_and_retryable() {
    let fx = loaded_fixture().await;
    fx.signer.set_script(SignerScript::Reject);

    let err = fx.coordinator.reveal(ItemId::new(1)).await.unwrap_err();
    assert_eq!(err, DisclosureError::UserRejected);
    assert!(err.is_cancelled());

    let item = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    assert_eq!(item.attack, None);
    assert_eq!(item.defense, None);
    assert_matches!(item.status, DisclosureStatus::Failed(DisclosureError::UserRejected));
    assert_eq!(fx.relay.call_count(), 0);

    // Retry from Failed succeeds once the owner approves.
    fx.signer.set_script(SignerScript::Sign);
    let outcome = fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    assert_eq!(
        outcome,
        RevealOutcome::Revealed {
            attack: 42,
            defense: 37
        }
    );
}

#[tokio::test]
async fn unavailable_signer_fails_without_contacting_the_relay() {
    let fx = loaded_fixture().await;
    fx.signer.set_script(SignerScript::Unavailable);

    let err = fx.coordinator.reveal(ItemId::new(1)).await.unwrap_err();
    assert_matches!(err, DisclosureError::SignerUnavailable(_));
    assert!(!err.is_cancelled());

    let item = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    assert_eq!(item.attack, None);
    assert_eq!(item.defense, None);
    assert_matches!(
        item.status,
        DisclosureStatus::Failed(DisclosureError::SignerUnavailable(_))
    );
    assert_eq!(fx.relay.call_count(), 0);
}

#[tokio::test]
async fn partial_relay_response_reveals_nothing() {
    let fx = loaded_fixture().await;
    fx.relay
        .set_mode(RelayMode::OmitHandles(vec![CiphertextHandle::new("0xbb")]));

    let err = fx.coordinator.reveal(ItemId::new(1)).await.unwrap_err();
    assert_matches!(err, DisclosureError::RelayRejected(_));

    // Atomic per item: neither attribute may be set from a partial answer.
    let item = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    assert_eq!(item.attack, None);
    assert_eq!(item.defense, None);
    assert_matches!(item.status, DisclosureStatus::Failed(_));
}

#[tokio::test]
async fn disconnect_discards_in_flight_result() {
    let fx = loaded_fixture().await;
    fx.relay.hold_responses();

    let background = fx.coordinator.clone();
    let task = tokio::spawn(async move { background.reveal(ItemId::new(1)).await });
    wait_for_relay_call(&fx.relay, 1).await;

    // Owner disconnects while the relay is still working.
    fx.coordinator.reset().await;
    fx.relay.release();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, RevealOutcome::Discarded);
    assert!(fx.coordinator.items().await.is_empty());

    // A fresh load sees a clean, locked record.
    fx.relay.unhold();
    fx.coordinator
        .load(OwnerAddress::new(OWNER))
        .await
        .unwrap();
    let item = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    assert_eq!(item.attack, None);
    assert_eq!(item.status, DisclosureStatus::Locked);
}

#[tokio::test]
async fn disconnect_discards_in_flight_load() {
    let fx = loaded_fixture().await;
    fx.ledger.hold_reads();

    let background = fx.coordinator.clone();
    let task = tokio::spawn(async move { background.load(OwnerAddress::new(OWNER)).await });
    wait_for_ledger_read(&fx.ledger, 2).await;

    // Owner disconnects while the ledger read is still in flight.
    fx.coordinator.reset().await;
    fx.ledger.release();
    task.await.unwrap().unwrap();

    // The disconnected owner's items must not reappear.
    let state = fx.coordinator.state().await;
    assert!(state.owner().is_none());
    assert!(state.items().is_empty());
    assert_eq!(state.phase(), &InventoryPhase::Idle);
}

#[tokio::test]
async fn newer_load_supersedes_an_unfinished_one() {
    let fx = loaded_fixture().await;
    fx.ledger.mint(
        ItemId::new(2),
        MintedItem {
            owner: OwnerAddress::new("0xbob"),
            rarity: Rarity::Common,
            attack_handle: CiphertextHandle::new("0xcc"),
            defense_handle: CiphertextHandle::new("0xdd"),
        },
    );
    fx.ledger.hold_reads();

    let first = fx.coordinator.clone();
    let first_task = tokio::spawn(async move { first.load(OwnerAddress::new(OWNER)).await });
    wait_for_ledger_read(&fx.ledger, 2).await;
    let second = fx.coordinator.clone();
    let second_task =
        tokio::spawn(async move { second.load(OwnerAddress::new("0xbob")).await });
    wait_for_ledger_read(&fx.ledger, 3).await;

    fx.ledger.release();
    fx.ledger.release();
    first_task.await.unwrap().unwrap();
    second_task.await.unwrap().unwrap();

    // Whatever order the reads finish in, only the newer load installs.
    let state = fx.coordinator.state().await;
    assert_eq!(state.owner(), Some(&OwnerAddress::new("0xbob")));
    let items = state.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ItemId::new(2));
}

#[tokio::test]
async fn reveals_on_distinct_items_are_independent() {
    let fx = loaded_fixture().await;
    // Item #2's plaintexts are unknown to the relay, so its batch comes
    // back incomplete while item #1 succeeds.
    mint(&fx, 2, "0xcc", "0xdd");
    fx.coordinator
        .load(OwnerAddress::new(OWNER))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        fx.coordinator.reveal(ItemId::new(1)),
        fx.coordinator.reveal(ItemId::new(2)),
    );
    assert_matches!(first.unwrap(), RevealOutcome::Revealed { .. });
    assert_matches!(second.unwrap_err(), DisclosureError::RelayRejected(_));

    let one = fx.coordinator.item(ItemId::new(1)).await.unwrap();
    let two = fx.coordinator.item(ItemId::new(2)).await.unwrap();
    assert_eq!(one.status, DisclosureStatus::Revealed);
    assert_matches!(two.status, DisclosureStatus::Failed(_));
    assert_eq!(two.attack, None);
}

#[tokio::test]
async fn session_material_is_never_reused() {
    let fx = loaded_fixture().await;
    mint(&fx, 2, "0xcc", "0xdd");
    fx.relay.insert_plaintext(CiphertextHandle::new("0xcc"), 7);
    fx.relay.insert_plaintext(CiphertextHandle::new("0xdd"), 9);
    fx.coordinator
        .load(OwnerAddress::new(OWNER))
        .await
        .unwrap();

    fx.coordinator.reveal(ItemId::new(1)).await.unwrap();
    fx.coordinator.reveal(ItemId::new(2)).await.unwrap();

    let keys = fx.relay.seen_public_keys();
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);

    let signatures = fx.relay.seen_signatures();
    assert_eq!(signatures.len(), 2);
    assert_ne!(signatures[0], signatures[1]);
}

#[tokio::test]
async fn missing_capabilities_fail_fast_without_side_effects() {
    // No relay configured.
    let fx = fixture();
    mint(&fx, 1, "0xaa", "0xbb");
    let no_relay = InventoryCoordinator::new(
        fx.ledger.clone(),
        Arc::new(OsRngKeyHandler::new()),
        Arc::new(FixedTimeHandler::at(1_700_000_000)),
        policy(),
    )
    .with_signer(fx.signer.clone());
    no_relay.load(OwnerAddress::new(OWNER)).await.unwrap();

    let err = no_relay.reveal(ItemId::new(1)).await.unwrap_err();
    assert_matches!(err, DisclosureError::CapabilityUnavailable(ref what) if what.contains("relay"));
    assert_eq!(fx.signer.prompt_count(), 0);
    let item = no_relay.item(ItemId::new(1)).await.unwrap();
    assert!(!item.status.is_in_flight());
    assert_matches!(item.status, DisclosureStatus::Failed(_));

    // No signer configured; the message names the other capability.
    let no_signer = InventoryCoordinator::new(
        fx.ledger.clone(),
        Arc::new(OsRngKeyHandler::new()),
        Arc::new(FixedTimeHandler::at(1_700_000_000)),
        policy(),
    )
    .with_relay(fx.relay.clone());
    no_signer.load(OwnerAddress::new(OWNER)).await.unwrap();
    let err = no_signer.reveal(ItemId::new(1)).await.unwrap_err();
    assert_matches!(err, DisclosureError::CapabilityUnavailable(ref what) if what.contains("signer"));
    assert_eq!(fx.relay.call_count(), 0);
}

#[tokio::test]
async fn failed_load_preserves_previous_items() {
    let fx = loaded_fixture().await;
    fx.ledger.set_fail_reads(true);

    let err = fx
        .coordinator
        .load(OwnerAddress::new(OWNER))
        .await
        .unwrap_err();
    assert_matches!(err, DisclosureError::LoadFailed(_));

    let state = fx.coordinator.state().await;
    assert_matches!(state.phase(), InventoryPhase::Failed(_));
    assert_eq!(state.items().len(), 1);
}

#[tokio::test]
async fn unknown_item_is_rejected() {
    let fx = loaded_fixture().await;
    let err = fx.coordinator.reveal(ItemId::new(99)).await.unwrap_err();
    assert_eq!(err, DisclosureError::UnknownItem(ItemId::new(99)));
}
