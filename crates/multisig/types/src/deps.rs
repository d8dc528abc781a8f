//! Deps: per-account allow-list of modules that may attach actions
//!
//! Each entry pins a module name to the address and version the account
//! trusts. The list is ordered and replaced wholesale by a
//! governance-approved dependency change.

use crate::{MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the core module that governs the account itself. It can never
/// be dropped from an account's deps.
pub const CORE_MODULE: &str = "config";

/// A single trusted module
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dep {
    pub name: String,
    pub addr: String,
    pub version: u64,
}

impl Dep {
    pub fn new(name: impl Into<String>, addr: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            version,
        }
    }
}

impl std::fmt::Display for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.addr)
    }
}

/// The ordered dependency table of an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deps {
    inner: Vec<Dep>,
}

impl Deps {
    /// Build a deps table, rejecting duplicate names and a missing core module
    pub fn new(deps: Vec<Dep>) -> MultisigResult<Self> {
        let mut seen = HashSet::new();
        for dep in &deps {
            if !seen.insert(dep.name.as_str()) {
                return Err(MultisigError::DuplicateDep(dep.name.clone()));
            }
        }
        if !seen.contains(CORE_MODULE) {
            return Err(MultisigError::MissingCoreDep(CORE_MODULE.to_string()));
        }
        Ok(Self { inner: deps })
    }

    pub fn get(&self, name: &str) -> MultisigResult<&Dep> {
        self.inner
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| MultisigError::DepNotFound(name.to_string()))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.inner.iter().any(|d| d.name == name)
    }

    pub fn contains_addr(&self, addr: &str) -> bool {
        self.inner.iter().any(|d| d.addr == addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dep> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
