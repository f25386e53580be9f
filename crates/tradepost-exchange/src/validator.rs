//! Trade validator: sufficiency and equal-value checks over the locked
//! snapshot.
//!
//! Pure: reads the [`LockedInventory`] returned by the reader and the
//! catalog entries resolved for the request, nothing else. Each bundle is
//! checked against its *giver's* locked rows and priced by catalog weight:
//!
//! ```text
//! bundle_a ── checked against ──▶ actor_a's rows ──▶ value_a
//! bundle_b ── checked against ──▶ actor_b's rows ──▶ value_b
//!                                         value_a == value_b ?
//! ```
//!
//! Repeated lines for the same resource within a bundle are summed before
//! the sufficiency check. A row missing from the snapshot (never held, zero
//! quantity, or the giver is quarantined) is an `ItemNotInInventory`.
//! Values are exact: a bundle worth more than `u64::MAX` points is rejected
//! rather than clamped.

use std::collections::HashMap;

use tradepost_types::{
    ActorId, Bundle, LockedInventory, Resource, Result, TradeRequest, TradepostError,
};

/// Validate `request` against `locked`, pricing lines with `prices`.
/// Returns the point value of each side.
///
/// Checks run in a fixed order: sufficiency of `bundle_a`, sufficiency of
/// `bundle_b`, then value equality.
pub fn validate(
    locked: &LockedInventory,
    request: &TradeRequest,
    prices: &HashMap<String, Resource>,
) -> Result<u64> {
    let offered = price_from_giver(locked, prices, request.actor_a, &request.bundle_a)?;
    let requested = price_from_giver(locked, prices, request.actor_b, &request.bundle_b)?;

    if offered != requested {
        return Err(TradepostError::UnequalValue { offered, requested });
    }
    Ok(offered)
}

/// Sum of `weight × quantity` over `bundle`, failing if `giver` cannot cover
/// any line.
fn price_from_giver(
    locked: &LockedInventory,
    prices: &HashMap<String, Resource>,
    giver: ActorId,
    bundle: &Bundle,
) -> Result<u64> {
    let mut value = 0u64;
    for (name, wanted) in bundle.totals() {
        let entry = locked
            .get(giver, name)
            .ok_or_else(|| TradepostError::ItemNotInInventory {
                resource: name.to_string(),
                actor: giver,
            })?;
        let available = u64::from(entry.quantity);
        if available < wanted {
            return Err(TradepostError::InsufficientStock {
                resource: name.to_string(),
                actor: giver,
                requested: wanted,
                available,
            });
        }

        let resource = prices
            .get(name)
            .ok_or_else(|| TradepostError::UnknownResources {
                names: vec![name.to_string()],
            })?;
        value = resource
            .value_of(wanted)
            .and_then(|line| value.checked_add(line))
            .ok_or(TradepostError::ValueOverflow { actor: giver })?;
    }
    Ok(value)
}
