//! Resource catalog: name → value weight, loaded once per process.
//!
//! The catalog table is static after provisioning, so a snapshot taken at
//! startup is safe to share for the process lifetime.

use std::collections::{BTreeSet, HashMap};

use tradepost_store::Store;
use tradepost_types::{Resource, Result, TradepostError};

/// Read-only view of the catalog.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: HashMap<String, Resource>,
}

impl ResourceCatalog {
    /// Build a catalog from explicit entries.
    #[must_use]
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            resources: resources.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    /// Snapshot the catalog table.
    pub fn load(store: &Store) -> Result<Self> {
        let catalog = Self::new(store.catalog()?);
        tracing::debug!(resources = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Resolve every name, or fail listing all unrecognized names (sorted).
    pub fn resolve<'a, I>(&self, names: I) -> Result<HashMap<String, Resource>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut found = HashMap::new();
        let mut unknown = BTreeSet::new();
        for name in names {
            match self.resources.get(name) {
                Some(resource) => {
                    found.insert(name.to_string(), resource.clone());
                }
                None => {
                    unknown.insert(name.to_string());
                }
            }
        }
        if !unknown.is_empty() {
            return Err(TradepostError::UnknownResources {
                names: unknown.into_iter().collect(),
            });
        }
        Ok(found)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
