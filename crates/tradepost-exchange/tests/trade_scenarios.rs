//! Integration tests: end-to-end trade outcomes against a real store.
//!
//! Every test provisions a fresh in-memory store with the default catalog
//! (Water 4, Food 3, Medication 2, Ammunition 1) and drives the public
//! orchestrator API only.

use std::collections::BTreeMap;
use std::sync::Arc;

use tradepost_exchange::{
    EligibilityCache, InMemoryEligibilityCache, ResourceCatalog, TradeOrchestrator, TradeReply,
};
use tradepost_store::Store;
use tradepost_types::{ActorId, LineItem, TradeRequest, TradepostConfig, TradepostError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Camp {
    store: Store,
    exchange: TradeOrchestrator,
    cache: Arc<InMemoryEligibilityCache>,
}

impl Camp {
    fn new() -> Self {
        let store = Store::open_in_memory(200).unwrap();
        store.migrate(&TradepostConfig::default().catalog).unwrap();
        let catalog = Arc::new(ResourceCatalog::load(&store).unwrap());
        let cache = Arc::new(InMemoryEligibilityCache::new());
        let exchange =
            TradeOrchestrator::new(catalog, Arc::clone(&cache) as Arc<dyn EligibilityCache>);
        Self {
            store,
            exchange,
            cache,
        }
    }

    fn actor(&self, name: &str, holdings: &[(&str, u32)]) -> ActorId {
        let id = self.store.register_actor(name).unwrap();
        for (resource, qty) in holdings {
            self.store.grant(id, resource, *qty).unwrap();
        }
        id
    }

    fn trade(&mut self, request: &TradeRequest) -> Result<u64, TradepostError> {
        self.exchange
            .execute(&mut self.store, request)
            .map(|receipt| receipt.value)
    }

    fn held(&self, actor: ActorId, resource: &str) -> u32 {
        self.store
            .quantity_of(actor, resource)
            .unwrap()
            .unwrap_or(0)
    }

    fn snapshot(&self, actors: &[ActorId]) -> BTreeMap<ActorId, BTreeMap<String, u32>> {
        actors
            .iter()
            .map(|a| (*a, self.store.inventory_of(*a).unwrap()))
            .collect()
    }
}

fn items(lines: &[(&str, u32)]) -> Vec<LineItem> {
    lines.iter().map(|(n, q)| LineItem::new(*n, *q)).collect()
}

fn offer(a: ActorId, b: ActorId, give_a: &[(&str, u32)], give_b: &[(&str, u32)]) -> TradeRequest {
    TradeRequest::new(a, b, items(give_a), items(give_b))
}

/// Actor 1 holds 5 Medication, actor 2 holds 5 Food.
fn medic_and_cook(camp: &Camp) -> (ActorId, ActorId) {
    let medic = camp.actor("Medic", &[("Medication", 5)]);
    let cook = camp.actor("Cook", &[("Food", 5)]);
    (medic, cook)
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn medication_for_food_commits() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);

    let value = camp
        .trade(&offer(medic, cook, &[("Medication", 3)], &[("Food", 2)]))
        .unwrap();

    assert_eq!(value, 6);
    assert_eq!(camp.held(medic, "Medication"), 2);
    assert_eq!(camp.held(medic, "Food"), 2);
    assert_eq!(camp.held(cook, "Food"), 3);
    assert_eq!(camp.held(cook, "Medication"), 3);
}

#[test]
fn unequal_value_leaves_inventories_unchanged() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);
    let before = camp.snapshot(&[medic, cook]);

    let err = camp
        .trade(&offer(medic, cook, &[("Medication", 3)], &[("Food", 3)]))
        .unwrap_err();

    assert_eq!(
        err,
        TradepostError::UnequalValue {
            offered: 6,
            requested: 9
        }
    );
    assert_eq!(camp.snapshot(&[medic, cook]), before);
    assert_eq!(camp.held(medic, "Medication"), 5);
    assert_eq!(camp.held(medic, "Food"), 0);
    assert_eq!(camp.held(cook, "Medication"), 0);
    assert_eq!(camp.held(cook, "Food"), 5);
}

#[test]
fn quarantined_counterpart_fails_on_store_then_cache() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);
    camp.store.flag_quarantined(cook).unwrap();
    let before = camp.snapshot(&[medic, cook]);
    let request = offer(medic, cook, &[("Medication", 3)], &[("Food", 2)]);

    // First exposure: the cook's rows are invisible to the locked read.
    let err = camp.trade(&request).unwrap_err();
    assert_eq!(
        err,
        TradepostError::ItemNotInInventory {
            resource: "Food".into(),
            actor: cook
        }
    );
    assert_eq!(camp.snapshot(&[medic, cook]), before);

    // Once the cache knows, the trade never reaches the store.
    camp.cache.flag(&[cook]);
    assert_eq!(
        camp.trade(&request).unwrap_err(),
        TradepostError::ActorQuarantined(cook)
    );
    assert_eq!(camp.snapshot(&[medic, cook]), before);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn committed_trade_touches_only_exchanged_rows() {
    let mut camp = Camp::new();
    let a = camp.actor("A", &[("Water", 3), ("Ammunition", 10)]);
    let b = camp.actor("B", &[("Food", 4), ("Medication", 1)]);
    let bystander = camp.actor("C", &[("Water", 7), ("Food", 7)]);
    let bystander_before = camp.snapshot(&[bystander]);

    // 3 Water (12) for 4 Food (12)
    camp.trade(&offer(a, b, &[("Water", 3)], &[("Food", 4)])).unwrap();

    let after = camp.snapshot(&[a, b]);
    assert_eq!(
        after[&a],
        BTreeMap::from([
            ("Ammunition".to_string(), 10),
            ("Food".to_string(), 4),
            ("Water".to_string(), 0),
        ])
    );
    assert_eq!(
        after[&b],
        BTreeMap::from([
            ("Food".to_string(), 0),
            ("Medication".to_string(), 1),
            ("Water".to_string(), 3),
        ])
    );
    assert_eq!(camp.snapshot(&[bystander]), bystander_before);
}

#[test]
fn drained_rows_are_kept_at_zero() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);

    camp.trade(&offer(medic, cook, &[("Medication", 3)], &[("Food", 2)])).unwrap();
    let err = camp
        .trade(&offer(medic, cook, &[("Medication", 3)], &[("Food", 2)]))
        .unwrap_err();
    assert_eq!(
        err,
        TradepostError::InsufficientStock {
            resource: "Medication".into(),
            actor: medic,
            requested: 3,
            available: 2
        }
    );

    // Swap back: the medic's Food and the cook's Medication both hit zero.
    camp.trade(&offer(medic, cook, &[("Food", 2)], &[("Medication", 3)])).unwrap();
    assert_eq!(camp.store.quantity_of(medic, "Food").unwrap(), Some(0));
    assert_eq!(camp.store.quantity_of(cook, "Medication").unwrap(), Some(0));
    assert_eq!(camp.held(medic, "Medication"), 5);
    assert_eq!(camp.held(cook, "Food"), 5);
}

#[test]
fn insufficient_stock_leaves_inventories_unchanged() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);
    let before = camp.snapshot(&[medic, cook]);

    let err = camp
        .trade(&offer(medic, cook, &[("Medication", 6)], &[("Food", 4)]))
        .unwrap_err();

    assert!(matches!(
        err,
        TradepostError::InsufficientStock {
            requested: 6,
            available: 5,
            ..
        }
    ));
    assert_eq!(camp.snapshot(&[medic, cook]), before);
}

#[test]
fn resource_never_held_is_not_in_inventory() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);

    let err = camp
        .trade(&offer(medic, cook, &[("Water", 3)], &[("Food", 4)]))
        .unwrap_err();

    assert_eq!(
        err,
        TradepostError::ItemNotInInventory {
            resource: "Water".into(),
            actor: medic
        }
    );
}

#[test]
fn quarantine_found_in_post_check_rolls_back_and_updates_cache() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);
    camp.store.flag_quarantined(medic).unwrap();
    let before = camp.snapshot(&[medic, cook]);

    // Empty bundles pass validation even for an actor whose rows are hidden,
    // so the live post-check is the first place the flag is seen.
    let err = camp.trade(&offer(medic, cook, &[], &[])).unwrap_err();

    assert_eq!(
        err,
        TradepostError::QuarantinedActors {
            actors: vec![medic]
        }
    );
    assert!(camp.cache.is_flagged(medic));
    assert!(!camp.cache.is_flagged(cook));
    assert_eq!(camp.snapshot(&[medic, cook]), before);

    // Any later trade by the medic is now stopped by the cache.
    assert_eq!(
        camp.trade(&offer(medic, cook, &[("Medication", 3)], &[("Food", 2)]))
            .unwrap_err(),
        TradepostError::ActorQuarantined(medic)
    );
}

#[test]
fn both_quarantined_are_reported_and_cached() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);
    camp.store.flag_quarantined(cook).unwrap();
    camp.store.flag_quarantined(medic).unwrap();

    let err = camp.trade(&offer(cook, medic, &[], &[])).unwrap_err();

    let mut expected = vec![medic, cook];
    expected.sort();
    assert_eq!(err, TradepostError::QuarantinedActors { actors: expected });
    assert_eq!(camp.cache.len(), 2);
}

#[test]
fn self_trade_always_fails() {
    let mut camp = Camp::new();
    let (medic, _cook) = medic_and_cook(&camp);

    for request in [
        offer(medic, medic, &[], &[]),
        offer(medic, medic, &[("Medication", 1)], &[("Medication", 1)]),
        offer(medic, medic, &[("Silk", 1)], &[("Medication", 0)]),
    ] {
        assert_eq!(camp.trade(&request).unwrap_err(), TradepostError::SelfTrade);
    }
    assert_eq!(camp.held(medic, "Medication"), 5);
}

#[test]
fn same_resource_on_both_sides_needs_pre_trade_stock() {
    let mut camp = Camp::new();
    let a = camp.actor("A", &[("Water", 2)]);
    let b = camp.actor("B", &[("Water", 1)]);

    // A cannot lean on the Water B is about to send.
    let err = camp
        .trade(&offer(a, b, &[("Water", 3)], &[("Water", 3)]))
        .unwrap_err();
    assert!(matches!(err, TradepostError::InsufficientStock { .. }));

    camp.trade(&offer(a, b, &[("Water", 1)], &[("Water", 1)])).unwrap();
    assert_eq!(camp.held(a, "Water"), 2);
    assert_eq!(camp.held(b, "Water"), 1);
}

#[test]
fn unknown_resources_fail_before_any_lock() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);

    let err = camp
        .trade(&offer(medic, cook, &[("Silk", 1), ("Medication", 1)], &[("Gold", 1)]))
        .unwrap_err();

    assert_eq!(
        err,
        TradepostError::UnknownResources {
            names: vec!["Gold".into(), "Silk".into()]
        }
    );
}

#[test]
fn supply_is_conserved_across_mixed_outcomes() {
    let mut camp = Camp::new();
    let a = camp.actor("A", &[("Water", 6), ("Ammunition", 20)]);
    let b = camp.actor("B", &[("Food", 8), ("Medication", 6)]);
    let names = ["Water", "Food", "Medication", "Ammunition"];
    let supply_before: Vec<u64> = names
        .iter()
        .map(|n| camp.store.total_supply(n).unwrap())
        .collect();

    let requests = [
        offer(a, b, &[("Water", 3)], &[("Food", 4)]),
        offer(a, b, &[("Ammunition", 6)], &[("Medication", 3)]),
        offer(b, a, &[("Food", 1)], &[("Ammunition", 3)]),
        offer(a, b, &[("Water", 9)], &[("Food", 12)]),
        offer(b, a, &[("Medication", 2)], &[("Water", 1)]),
    ];
    for request in &requests {
        let _ = camp.trade(request);
    }

    let supply_after: Vec<u64> = names
        .iter()
        .map(|n| camp.store.total_supply(n).unwrap())
        .collect();
    assert_eq!(supply_before, supply_after);
}

// ---------------------------------------------------------------------------
// Reply mapping
// ---------------------------------------------------------------------------

#[test]
fn replies_follow_outcome() {
    let mut camp = Camp::new();
    let (medic, cook) = medic_and_cook(&camp);

    let ok = camp
        .exchange
        .execute(&mut camp.store, &offer(medic, cook, &[("Medication", 3)], &[("Food", 2)]));
    let reply = TradeReply::from(&ok);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["message"], "Trade completed");

    let failed = camp
        .exchange
        .execute(&mut camp.store, &offer(medic, cook, &[("Medication", 2)], &[("Food", 2)]));
    let reply = TradeReply::from(&failed);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "Unequal point value: 4 offered vs 6 requested");
}
