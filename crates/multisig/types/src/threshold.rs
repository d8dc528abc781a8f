//! Threshold table: approval weight required per role
//!
//! The global entry is always present. Other entries are keyed by role name,
//! which for intents is the owner module's name.

use crate::{MultisigError, MultisigResult, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    thresholds: BTreeMap<Role, u64>,
}

impl ThresholdTable {
    /// Create a table holding only the global threshold
    pub fn new(global: u64) -> Self {
        let mut thresholds = BTreeMap::new();
        thresholds.insert(Role::global(), global);
        Self { thresholds }
    }

    /// The global threshold. Always resolves.
    pub fn global(&self) -> u64 {
        self.thresholds.get(&Role::global()).copied().unwrap_or(0)
    }

    /// Threshold for `role`; absent roles are an error, not zero
    pub fn threshold(&self, role: &Role) -> MultisigResult<u64> {
        self.thresholds
            .get(role)
            .copied()
            .ok_or_else(|| MultisigError::RoleNotFound(role.clone()))
    }

    /// Threshold for `role` if one is configured
    pub fn get(&self, role: &Role) -> Option<u64> {
        self.thresholds.get(role).copied()
    }

    pub fn set_threshold(&mut self, role: Role, threshold: u64) {
        self.thresholds.insert(role, threshold);
    }

    /// Remove a role threshold. The global entry cannot be removed.
    pub fn remove(&mut self, role: &Role) -> Option<u64> {
        if role.is_global() {
            return None;
        }
        self.thresholds.remove(role)
    }

    /// Role thresholds, global excluded
    pub fn roles(&self) -> impl Iterator<Item = (&Role, u64)> {
        self.thresholds
            .iter()
            .filter(|(role, _)| !role.is_global())
            .map(|(role, t)| (role, *t))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Role, u64)> {
        self.thresholds.iter().map(|(role, t)| (role, *t))
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(1)
    }
}
