//! Extensions registry
//!
//! The allow-list of modules (and their published versions) that accounts
//! may depend on. A module is published under its witness type, which binds
//! the name to code: accounts only admit intents from the witness a name was
//! published with. Accounts only read from it: trust checks when deps
//! change, witness lookups when intents are created, and latest-version
//! lookups when refreshing deps.

use crate::witness::Witness;
use dashmap::DashMap;
use std::any::TypeId;
use tracing::{info, warn};

/// Read interface accounts consume
pub trait ExtensionsRegistry: Send + Sync {
    /// Whether `name` was published at `addr` with `version`
    fn is_trusted(&self, name: &str, addr: &str, version: u64) -> bool;

    /// Latest published `(addr, version)` of `name`
    fn latest_version(&self, name: &str) -> Option<(String, u64)>;

    /// Witness type `name` was published with
    fn witness(&self, name: &str) -> Option<TypeId>;
}

#[derive(Debug)]
struct Published {
    witness: TypeId,
    /// Publication order; the last one is the latest
    versions: Vec<(String, u64)>,
}

/// In-memory extensions registry
pub struct InMemoryExtensions {
    by_name: DashMap<String, Published>,
}

impl InMemoryExtensions {
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
        }
    }

    pub fn with_extension<W: Witness>(self, addr: &str, version: u64) -> Self {
        self.add::<W>(addr, version);
        self
    }

    /// Publish a new module under `W::MODULE`. Returns false if the name is
    /// already taken.
    pub fn add<W: Witness>(&self, addr: &str, version: u64) -> bool {
        let name = W::MODULE;
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(
            name.to_string(),
            Published {
                witness: TypeId::of::<W>(),
                versions: vec![(addr.to_string(), version)],
            },
        );
        info!(extension = name, addr, version, "Extension added");
        true
    }

    /// Publish a new version of a known module. Returns false if the module
    /// is unknown, was published with another witness, or the version does
    /// not increase.
    pub fn update<W: Witness>(&self, addr: &str, version: u64) -> bool {
        let name = W::MODULE;
        let Some(mut published) = self.by_name.get_mut(name) else {
            return false;
        };
        if published.witness != TypeId::of::<W>() {
            warn!(extension = name, "Update rejected: witness differs from publication");
            return false;
        }
        if published.versions.last().is_some_and(|(_, v)| *v >= version) {
            return false;
        }
        published.versions.push((addr.to_string(), version));
        info!(extension = name, addr, version, "Extension updated");
        true
    }

    /// Withdraw a module entirely
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.by_name.remove(name).is_some();
        if removed {
            info!(extension = name, "Extension removed");
        }
        removed
    }

    /// All published versions of a module
    pub fn versions(&self, name: &str) -> Vec<(String, u64)> {
        self.by_name
            .get(name)
            .map(|p| p.value().versions.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryExtensions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionsRegistry for InMemoryExtensions {
    fn is_trusted(&self, name: &str, addr: &str, version: u64) -> bool {
        self.by_name
            .get(name)
            .map(|p| p.versions.iter().any(|(a, v)| a == addr && *v == version))
            .unwrap_or(false)
    }

    fn latest_version(&self, name: &str) -> Option<(String, u64)> {
        self.by_name.get(name).and_then(|p| p.versions.last().cloned())
    }

    fn witness(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).map(|p| p.witness)
    }
}
