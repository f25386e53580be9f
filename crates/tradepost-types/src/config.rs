//! Configuration types for a Tradepost deployment.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! [store]
//! path = "tradepost.db"
//! lock_timeout_ms = 5000
//! wal = true
//!
//! [[catalog]]
//! name = "Water"
//! value_weight = 4
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Resource, Result, TradepostError, constants};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradepostConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Resources provisioned into the catalog table by migration.
    #[serde(default = "default_catalog")]
    pub catalog: Vec<ResourceSeed>,
}

impl Default for TradepostConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            catalog: default_catalog(),
        }
    }
}

/// Persistent store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. Ignored for in-memory stores.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Bound on waiting for a contended inventory lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Write-ahead journaling for file-backed stores.
    #[serde(default = "default_true")]
    pub wal: bool,
}

impl StoreConfig {
    /// Settings for a store at `path` with everything else defaulted.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
            wal: true,
        }
    }
}

/// A catalog row to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSeed {
    pub name: String,
    pub value_weight: u32,
}

impl From<&ResourceSeed> for Resource {
    fn from(seed: &ResourceSeed) -> Self {
        Resource::new(seed.name.clone(), seed.value_weight)
    }
}

fn default_catalog() -> Vec<ResourceSeed> {
    constants::DEFAULT_CATALOG
        .iter()
        .map(|(name, value_weight)| ResourceSeed {
            name: (*name).to_string(),
            value_weight: *value_weight,
        })
        .collect()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(constants::DEFAULT_STORE_PATH)
}

fn default_lock_timeout_ms() -> u64 {
    constants::DEFAULT_LOCK_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl TradepostConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| TradepostError::Configuration(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.lock_timeout_ms == 0 {
            return Err(TradepostError::Configuration(
                "store.lock_timeout_ms must be greater than zero".into(),
            ));
        }

        let mut seen = HashSet::new();
        for seed in &self.catalog {
            let name = seed.name.trim();
            if name.is_empty() {
                return Err(TradepostError::Configuration(
                    "catalog entries must have a name".into(),
                ));
            }
            if name.len() > constants::MAX_RESOURCE_NAME_LEN {
                return Err(TradepostError::Configuration(format!(
                    "catalog name {name:?} exceeds {} characters",
                    constants::MAX_RESOURCE_NAME_LEN
                )));
            }
            if seed.value_weight == 0 {
                return Err(TradepostError::Configuration(format!(
                    "catalog entry {name:?} must have a positive value_weight"
                )));
            }
            if !seen.insert(name) {
                return Err(TradepostError::Configuration(format!(
                    "catalog entry {name:?} is listed twice"
                )));
            }
        }
        Ok(())
    }
}
