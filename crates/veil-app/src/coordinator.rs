//! Inventory coordinator
//!
//! Owns the authoritative item collection and drives per-item disclosure
//! sessions. The coordinator is the only writer of inventory state;
//! sessions run without the state lock held and only the entry for their
//! own item is written back. Cloning the coordinator clones cheap handles
//! to the same shared state.

use crate::disclosure::client::DisclosureClient;
use crate::disclosure::session::{self, ItemDisclosureContext};
use crate::views::inventory::InventoryState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use veil_core::effects::{
    LedgerEffects, LedgerError, RelayEffects, SessionKeyEffects, SignerEffects, TimeEffects,
};
use veil_core::{
    DisclosureError, DisclosureResult, DisclosureStatus, ItemId, ItemRecord, OwnerAddress, Rarity,
    ScopeAddress, SigningDomain,
};

/// Default authorization validity window, in days
///
/// A policy constant, not derived from the item: long enough that a slow
/// relay round trip never races the window, short enough that a leaked
/// signature goes stale quickly.
pub const DEFAULT_VALIDITY_DAYS: u32 = 10;

/// Default bounded wait for one relay round trip
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Disclosure policy: which contract, which signing domain, which limits
#[derive(Debug, Clone)]
pub struct DisclosurePolicy {
    /// Token contract all of this inventory's handles belong to
    pub token_contract: ScopeAddress,
    /// Domain descriptor for structured signing
    pub domain: SigningDomain,
    /// Authorization validity window in days
    pub validity_days: u32,
    /// Bounded wait for one relay round trip
    pub relay_timeout: Duration,
}

impl DisclosurePolicy {
    /// Create a policy with the default window and timeout
    pub fn new(token_contract: ScopeAddress, domain: SigningDomain) -> Self {
        Self {
            token_contract,
            domain,
            validity_days: DEFAULT_VALIDITY_DAYS,
            relay_timeout: DEFAULT_RELAY_TIMEOUT,
        }
    }

    /// Override the validity window
    #[must_use]
    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// Override the relay timeout
    #[must_use]
    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.relay_timeout = timeout;
        self
    }
}

/// Result of a `reveal` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Both attributes were revealed and committed
    Revealed {
        /// Revealed attack value
        attack: u64,
        /// Revealed defense value
        defense: u64,
    },
    /// A session for this item is already in flight; nothing was started
    AlreadyInFlight,
    /// The item is already revealed; nothing was started
    AlreadyRevealed,
    /// The session finished after the owner context changed; the result
    /// was discarded without touching any record
    Discarded,
}

/// Loads the owned-item list and drives per-item disclosure
#[derive(Clone)]
pub struct InventoryCoordinator {
    ledger: Arc<dyn LedgerEffects>,
    keys: Arc<dyn SessionKeyEffects>,
    time: Arc<dyn TimeEffects>,
    signer: Option<Arc<dyn SignerEffects>>,
    relay: Option<Arc<dyn RelayEffects>>,
    policy: DisclosurePolicy,
    state: Arc<RwLock<InventoryState>>,
}

impl InventoryCoordinator {
    /// Create a coordinator without signer or relay capabilities
    ///
    /// Loading works immediately; `reveal` fails fast with
    /// `CapabilityUnavailable` until both capabilities are attached.
    pub fn new(
        ledger: Arc<dyn LedgerEffects>,
        keys: Arc<dyn SessionKeyEffects>,
        time: Arc<dyn TimeEffects>,
        policy: DisclosurePolicy,
    ) -> Self {
        Self {
            ledger,
            keys,
            time,
            signer: None,
            relay: None,
            policy,
            state: Arc::new(RwLock::new(InventoryState::new())),
        }
    }

    /// Attach the owner's signing capability
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn SignerEffects>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Attach the relay client capability
    #[must_use]
    pub fn with_relay(mut self, relay: Arc<dyn RelayEffects>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Load the owned-item list for `owner`, replacing the collection
    ///
    /// A transport failure surfaces as `LoadFailed` at the inventory level
    /// and leaves previously loaded items untouched. A load whose ledger
    /// read completes after a `reset` or after a newer load began is
    /// discarded silently; it neither installs items nor changes the phase.
    pub async fn load(&self, owner: OwnerAddress) -> DisclosureResult<()> {
        let (generation, epoch) = {
            let mut state = self.state.write().await;
            state.begin_load();
            (state.generation(), state.load_epoch())
        };

        let loaded = self.read_inventory(&owner).await;
        let mut state = self.state.write().await;
        if state.generation() != generation || state.load_epoch() != epoch {
            tracing::debug!(owner = %owner, "owner context changed; discarding load result");
            return Ok(());
        }
        match loaded {
            Ok(items) => {
                tracing::debug!(owner = %owner, count = items.len(), "inventory loaded");
                state.install(owner, items);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(owner = %owner, %error, "inventory load failed");
                state.load_failed(error.to_string());
                Err(DisclosureError::load_failed(error.to_string()))
            }
        }
    }

    /// Disconnect: clear the collection and invalidate in-flight sessions
    pub async fn reset(&self) {
        self.state.write().await.clear();
    }

    /// Snapshot of all items in ledger order
    pub async fn items(&self) -> Vec<ItemRecord> {
        self.state.read().await.items()
    }

    /// Snapshot of one item
    pub async fn item(&self, id: ItemId) -> Option<ItemRecord> {
        self.state.read().await.item(id).cloned()
    }

    /// Snapshot of the full read model
    pub async fn state(&self) -> InventoryState {
        self.state.read().await.clone()
    }

    /// Reveal both encrypted attributes of one item
    ///
    /// At most one disclosure is in flight per item: a call while a session
    /// is running returns `AlreadyInFlight` without prompting or contacting
    /// the relay. Failures are recorded on the item and returned; retry is
    /// a plain `reveal` call.
    pub async fn reveal(&self, item_id: ItemId) -> DisclosureResult<RevealOutcome> {
        // Guard + precondition check, then the long-latency session without
        // the lock, then a generation-checked commit.
        let (ctx, generation) = {
            let mut state = self.state.write().await;
            let (status, attack_handle, defense_handle) = {
                let item = state
                    .item(item_id)
                    .ok_or(DisclosureError::UnknownItem(item_id))?;
                (
                    item.status.clone(),
                    item.attack_handle.clone(),
                    item.defense_handle.clone(),
                )
            };

            match status {
                DisclosureStatus::Disclosing => return Ok(RevealOutcome::AlreadyInFlight),
                DisclosureStatus::Revealed => return Ok(RevealOutcome::AlreadyRevealed),
                _ => {}
            }

            if let Err(error) = self.check_capabilities() {
                // Fail fast before any side effect; the item never enters
                // Disclosing.
                state.set_status(item_id, DisclosureStatus::Failed(error.clone()));
                return Err(error);
            }

            let ctx = ItemDisclosureContext {
                item_id,
                attack_handle,
                defense_handle,
                scope: self.policy.token_contract.clone(),
            };
            state.set_status(item_id, DisclosureStatus::Disclosing);
            (ctx, state.generation())
        };

        let result = self.run_session(&ctx).await;

        let mut state = self.state.write().await;
        if state.generation() != generation || state.item(item_id).is_none() {
            tracing::debug!(item = %item_id, "owner context changed; discarding session result");
            return Ok(RevealOutcome::Discarded);
        }

        match result {
            Ok(attrs) => {
                state.commit_revealed(item_id, attrs.attack, attrs.defense);
                tracing::debug!(item = %item_id, "attributes revealed");
                Ok(RevealOutcome::Revealed {
                    attack: attrs.attack,
                    defense: attrs.defense,
                })
            }
            Err(error) => {
                tracing::warn!(item = %item_id, %error, "disclosure failed");
                state.set_status(item_id, DisclosureStatus::Failed(error.clone()));
                Err(error)
            }
        }
    }

    fn check_capabilities(&self) -> DisclosureResult<()> {
        if self.signer.is_none() {
            return Err(DisclosureError::no_signer());
        }
        if self.relay.is_none() {
            return Err(DisclosureError::no_relay());
        }
        Ok(())
    }

    async fn run_session(
        &self,
        ctx: &ItemDisclosureContext,
    ) -> DisclosureResult<session::DisclosedAttributes> {
        let signer = self.signer.as_ref().ok_or_else(DisclosureError::no_signer)?;
        let relay = self.relay.as_ref().ok_or_else(DisclosureError::no_relay)?;
        let client = DisclosureClient::new(relay.clone(), self.policy.relay_timeout);
        session::run(
            &self.keys,
            &self.time,
            signer,
            &client,
            &self.policy.domain,
            self.policy.validity_days,
            ctx,
        )
        .await
    }

    async fn read_inventory(&self, owner: &OwnerAddress) -> Result<Vec<ItemRecord>, LedgerError> {
        let ids = self.ledger.owned_item_ids(owner).await?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let rarity: Rarity = self.ledger.rarity_of(id).await?;
            let attack_handle = self.ledger.attack_handle_of(id).await?;
            let defense_handle = self.ledger.defense_handle_of(id).await?;
            items.push(ItemRecord::locked(id, rarity, attack_handle, defense_handle));
        }
        Ok(items)
    }
}
