//! Trade orchestrator: one atomic pass over a two-party barter.
//!
//! ```text
//! intake checks ──▶ PRE_CHECK (cache) ──▶ begin tx
//!     ──▶ LOCK_AND_LOAD ──▶ VALIDATE ──▶ TRANSFER (B→A, then A→B)
//!     ──▶ POST_CHECK (live) ──▶ COMMITTED
//! ```
//!
//! Any failure after `begin` drops the [`TradeTx`](tradepost_store::TradeTx)
//! guard, which rolls back every transfer already applied. A failed
//! post-check additionally records the offending actors in the eligibility
//! cache, the one deliberate side effect of a rejected trade.

use std::sync::Arc;

use chrono::Utc;
use tradepost_store::{Store, lock_and_fetch, quarantined_among, transfer};
use tradepost_types::{
    ActorId, ErrorKind, Result, TradeId, TradePhase, TradeReceipt, TradeRequest, TradepostError,
};

use crate::catalog::ResourceCatalog;
use crate::eligibility::EligibilityCache;
use crate::validator;

/// Sequences the components of a trade. Shared across requests; each call
/// to [`execute`](Self::execute) brings its own store connection.
pub struct TradeOrchestrator {
    catalog: Arc<ResourceCatalog>,
    cache: Arc<dyn EligibilityCache>,
}

impl TradeOrchestrator {
    #[must_use]
    pub fn new(catalog: Arc<ResourceCatalog>, cache: Arc<dyn EligibilityCache>) -> Self {
        Self { catalog, cache }
    }

    #[must_use]
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn cache(&self) -> &dyn EligibilityCache {
        self.cache.as_ref()
    }

    /// Execute `request` against `store`. Commits entirely or not at all.
    ///
    /// # Errors
    /// - `SelfTrade`, `InvalidRequest`, `UnknownResources` before any transaction
    /// - `ActorQuarantined` on a cache hit, before any transaction
    /// - `LockTimeout` if another trade held the inventory too long (retryable)
    /// - `ItemNotInInventory`, `InsufficientStock`, `UnequalValue` from validation
    /// - `QuarantinedActors` if the live post-check finds a flagged actor
    /// - `Store` on an unexpected storage fault
    pub fn execute(&self, store: &mut Store, request: &TradeRequest) -> Result<TradeReceipt> {
        let trade_id = TradeId::new();
        tracing::debug!(
            trade_id = %trade_id,
            actor_a = %request.actor_a,
            actor_b = %request.actor_b,
            lines_a = request.bundle_a.len(),
            lines_b = request.bundle_b.len(),
            "Trade received"
        );

        let mut phase = TradePhase::PreCheck;
        match self.run(trade_id, store, request, &mut phase) {
            Ok(receipt) => {
                tracing::info!(
                    trade_id = %trade_id,
                    actor_a = %request.actor_a,
                    actor_b = %request.actor_b,
                    value = receipt.value,
                    phase = %TradePhase::Committed,
                    "Trade committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                if err.kind() == ErrorKind::Internal {
                    tracing::error!(
                        trade_id = %trade_id,
                        failed_at = %phase,
                        phase = %TradePhase::RolledBack,
                        error = %err,
                        "Trade aborted by internal fault"
                    );
                } else {
                    tracing::warn!(
                        trade_id = %trade_id,
                        actor_a = %request.actor_a,
                        actor_b = %request.actor_b,
                        failed_at = %phase,
                        phase = %TradePhase::RolledBack,
                        retryable = err.is_retryable(),
                        reason = %err.reason(),
                        "Trade rejected"
                    );
                }
                Err(err)
            }
        }
    }

    fn run(
        &self,
        trade_id: TradeId,
        store: &mut Store,
        request: &TradeRequest,
        phase: &mut TradePhase,
    ) -> Result<TradeReceipt> {
        // Intake: nothing here touches the store.
        if request.is_self_trade() {
            return Err(TradepostError::SelfTrade);
        }
        request.check_shape()?;
        let names = request.resource_names();
        let prices = self.catalog.resolve(names.iter().map(String::as_str))?;

        if let Some(actor) = self.cached_quarantine(request) {
            return Err(TradepostError::ActorQuarantined(actor));
        }

        let actors = request.actors_sorted();
        let tx = store.begin()?;

        *phase = TradePhase::LockAndLoad;
        advance(trade_id, *phase);
        let name_list: Vec<&str> = names.iter().map(String::as_str).collect();
        let locked = lock_and_fetch(&tx, &actors, &name_list)?;

        *phase = TradePhase::Validate;
        advance(trade_id, *phase);
        let value = validator::validate(&locked, request, &prices)?;

        *phase = TradePhase::Transfer;
        advance(trade_id, *phase);
        transfer(&tx, request.actor_b, request.actor_a, &request.bundle_b)?;
        transfer(&tx, request.actor_a, request.actor_b, &request.bundle_a)?;

        *phase = TradePhase::PostCheck;
        advance(trade_id, *phase);
        let flagged = quarantined_among(&tx, &actors)?;
        if !flagged.is_empty() {
            drop(tx);
            self.cache.flag(&flagged);
            return Err(TradepostError::QuarantinedActors { actors: flagged });
        }

        tx.commit()?;
        *phase = TradePhase::Committed;
        Ok(TradeReceipt {
            trade_id,
            actor_a: request.actor_a,
            actor_b: request.actor_b,
            value,
            committed_at: Utc::now(),
        })
    }

    /// First actor of the pair the cache already knows is quarantined.
    fn cached_quarantine(&self, request: &TradeRequest) -> Option<ActorId> {
        [request.actor_a, request.actor_b]
            .into_iter()
            .find(|actor| self.cache.is_flagged(*actor))
    }
}

fn advance(trade_id: TradeId, phase: TradePhase) {
    tracing::debug!(trade_id = %trade_id, phase = %phase, "Trade phase");
}
