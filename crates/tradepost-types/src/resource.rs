//! Catalog entries: the tradeable resources and their point values.

use serde::{Deserialize, Serialize};

/// An immutable catalog entry. `value_weight` is the point value of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub value_weight: u32,
}

impl Resource {
    #[must_use]
    pub fn new(name: impl Into<String>, value_weight: u32) -> Self {
        Self {
            name: name.into(),
            value_weight,
        }
    }

    /// Point value of `quantity` units, or `None` if it does not fit in a `u64`.
    #[must_use]
    pub fn value_of(&self, quantity: u64) -> Option<u64> {
        u64::from(self.value_weight).checked_mul(quantity)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} pts)", self.name, self.value_weight)
    }
}
