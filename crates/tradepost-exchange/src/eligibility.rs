//! Eligibility cache: process-wide memory of actors known to be quarantined.
//!
//! A fast-fail shortcut, not a source of truth. The store's `quarantined`
//! flag is authoritative; a miss here is always re-checked live inside the
//! trade transaction. Entries never expire: the flag only moves
//! false → true, so a positive entry can never go stale.

use dashmap::DashSet;
use tradepost_types::ActorId;

/// Keyed flag store consulted before a trade and updated after a failed
/// post-check. Implementations must tolerate concurrent writers.
pub trait EligibilityCache: Send + Sync {
    /// `true` if `actor` is known quarantined. Absent means `false`.
    fn is_flagged(&self, actor: ActorId) -> bool;

    /// Remember every actor in `actors` as quarantined. Idempotent.
    fn flag(&self, actors: &[ActorId]);
}

/// In-process cache backed by a concurrent set.
#[derive(Debug, Default)]
pub struct InMemoryEligibilityCache {
    flagged: DashSet<ActorId>,
}

impl InMemoryEligibilityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actors remembered as quarantined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

impl EligibilityCache for InMemoryEligibilityCache {
    fn is_flagged(&self, actor: ActorId) -> bool {
        self.flagged.contains(&actor)
    }

    fn flag(&self, actors: &[ActorId]) {
        for actor in actors {
            if self.flagged.insert(*actor) {
                tracing::debug!(actor = %actor, "Actor cached as quarantined");
            }
        }
    }
}
