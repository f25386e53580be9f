//! Trade request, bundle, and lifecycle types.
//!
//! A [`TradeRequest`] is an ephemeral value object handed in by the intake
//! layer. `bundle_a` is what `actor_a` gives, `bundle_b` is what `actor_b`
//! gives. Nothing here is persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, Result, TradeId, TradepostError, constants};

/// One line of a bundle: `quantity` units of the named resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "item", alias = "resource")]
    pub resource: String,
    pub quantity: u32,
}

impl LineItem {
    #[must_use]
    pub fn new(resource: impl Into<String>, quantity: u32) -> Self {
        Self {
            resource: resource.into(),
            quantity,
        }
    }
}

/// Ordered collection of line items offered by one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle(pub Vec<LineItem>);

impl Bundle {
    #[must_use]
    pub fn new(items: Vec<LineItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Requested quantity per resource, summing repeated lines.
    #[must_use]
    pub fn totals(&self) -> BTreeMap<&str, u64> {
        let mut totals = BTreeMap::new();
        for item in &self.0 {
            *totals.entry(item.resource.as_str()).or_insert(0) += u64::from(item.quantity);
        }
        totals
    }
}

impl From<Vec<LineItem>> for Bundle {
    fn from(items: Vec<LineItem>) -> Self {
        Self(items)
    }
}

/// A two-party barter request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    #[serde(alias = "survivor_a")]
    pub actor_a: ActorId,
    #[serde(alias = "survivor_b")]
    pub actor_b: ActorId,
    /// Given by `actor_a` to `actor_b`.
    #[serde(alias = "items_a")]
    pub bundle_a: Bundle,
    /// Given by `actor_b` to `actor_a`.
    #[serde(alias = "items_b")]
    pub bundle_b: Bundle,
}

impl TradeRequest {
    #[must_use]
    pub fn new(
        actor_a: ActorId,
        actor_b: ActorId,
        bundle_a: impl Into<Bundle>,
        bundle_b: impl Into<Bundle>,
    ) -> Self {
        Self {
            actor_a,
            actor_b,
            bundle_a: bundle_a.into(),
            bundle_b: bundle_b.into(),
        }
    }

    #[must_use]
    pub fn is_self_trade(&self) -> bool {
        self.actor_a == self.actor_b
    }

    /// Both actors, ascending. The order locks are requested in.
    #[must_use]
    pub fn actors_sorted(&self) -> Vec<ActorId> {
        let mut actors = vec![self.actor_a, self.actor_b];
        actors.sort_unstable();
        actors.dedup();
        actors
    }

    /// Union of resource names across both bundles, sorted and deduplicated.
    #[must_use]
    pub fn resource_names(&self) -> BTreeSet<String> {
        self.bundle_a
            .items()
            .chain(self.bundle_b.items())
            .map(|item| item.resource.clone())
            .collect()
    }

    /// Structural checks the core re-applies regardless of the intake layer:
    /// every line names a resource and asks for at least one unit.
    pub fn check_shape(&self) -> Result<()> {
        for (label, bundle) in [("bundle_a", &self.bundle_a), ("bundle_b", &self.bundle_b)] {
            for item in bundle.items() {
                let name = item.resource.trim();
                if name.is_empty() {
                    return Err(TradepostError::InvalidRequest {
                        reason: format!("every entry in {label} must name a resource"),
                    });
                }
                if name.len() > constants::MAX_RESOURCE_NAME_LEN {
                    return Err(TradepostError::InvalidRequest {
                        reason: format!(
                            "resource name in {label} exceeds {} characters",
                            constants::MAX_RESOURCE_NAME_LEN
                        ),
                    });
                }
                if item.quantity == 0 {
                    return Err(TradepostError::InvalidRequest {
                        reason: format!(
                            "quantity for item \"{}\" in {label} must be a positive integer",
                            item.resource
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TradeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actor {} ({} lines) <-> actor {} ({} lines)",
            self.actor_a,
            self.bundle_a.len(),
            self.actor_b,
            self.bundle_b.len()
        )
    }
}

// ---------------------------------------------------------------------------
// TradePhase
// ---------------------------------------------------------------------------

/// Where a trade attempt is in its single pass.
///
/// ```text
/// PRE_CHECK → LOCK_AND_LOAD → VALIDATE → TRANSFER → POST_CHECK → COMMITTED
///     │             │             │           │           │
///     └─────────────┴─────────────┴───────────┴───────────┴────▶ ROLLED_BACK
/// ```
///
/// Only the two terminal phases are externally observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradePhase {
    PreCheck,
    LockAndLoad,
    Validate,
    Transfer,
    PostCheck,
    Committed,
    RolledBack,
}

impl fmt::Display for TradePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreCheck => write!(f, "PRE_CHECK"),
            Self::LockAndLoad => write!(f, "LOCK_AND_LOAD"),
            Self::Validate => write!(f, "VALIDATE"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::PostCheck => write!(f, "POST_CHECK"),
            Self::Committed => write!(f, "COMMITTED"),
            Self::RolledBack => write!(f, "ROLLED_BACK"),
        }
    }
}

/// Acknowledgement of a committed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub trade_id: TradeId,
    pub actor_a: ActorId,
    pub actor_b: ActorId,
    /// Point value of each side (equal by construction).
    pub value: u64,
    pub committed_at: DateTime<Utc>,
}
