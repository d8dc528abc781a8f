//! Role names
//!
//! A role is a named authorization scope. Every module that owns intents
//! implicitly defines a role of the same name, so role-weighted approval
//! and module-typed approval are the same concept.

use serde::{Deserialize, Serialize};

/// Name of the reserved role every account carries a threshold for.
pub const GLOBAL_ROLE: &str = "global";

/// A named authorization scope
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role(pub String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved global role
    pub fn global() -> Self {
        Self(GLOBAL_ROLE.to_string())
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_ROLE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
