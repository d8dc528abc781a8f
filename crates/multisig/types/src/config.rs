//! Account configuration

use serde::{Deserialize, Serialize};

/// Configuration applied when an account is created
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Human-readable account name, stored in metadata under `name`
    pub name: String,
    /// Initial value of the account's allow-unverified-deps flag
    pub allow_unverified_deps: bool,
    /// Maximum actions per intent (0 = unlimited)
    pub max_actions_per_intent: usize,
    /// Maximum intent key length in bytes
    pub max_key_len: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            allow_unverified_deps: false,
            max_actions_per_intent: 64,
            max_key_len: 128,
        }
    }
}

impl AccountConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_unverified_deps(mut self, allow: bool) -> Self {
        self.allow_unverified_deps = allow;
        self
    }

    pub fn with_max_actions(mut self, max: usize) -> Self {
        self.max_actions_per_intent = max;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
