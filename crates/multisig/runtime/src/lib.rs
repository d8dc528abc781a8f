//! Multisig Account Runtime
//!
//! This crate provides the runtime for multisig accounts: groups of weighted
//! members that propose typed actions as intents, approve them against
//! role-scoped thresholds, and execute them through a single-use capability.
//!
//! # Architecture
//!
//! The [`Account`] is the main entry point. It owns the membership,
//! thresholds, deps and intent store, and drives the intent lifecycle:
//!
//! - [`Intent`] — pending request with an ordered, fixed action stack
//! - [`Action`] — contract action-type modules implement for their payloads
//! - [`Executable`] — capability draining an executed intent's actions in order
//! - [`Expired`] — actions of an intent deleted after its deadline
//! - [`ExtensionsRegistry`] — allow-list of modules accounts may depend on
//! - [`config_actions`] — the built-in module that changes account configuration
//!
//! Modules prove who they are with a zero-sized [`Witness`] type. Only the
//! module that owns an intent can attach, take or delete its actions.
//!
//! # Key Invariants
//!
//! 1. An intent's approval weights always equal the sums recorded for its
//!    current approvers
//! 2. Actions are consumed exactly once, in attachment order, at their
//!    attached type
//! 3. A capability cannot be silently dropped with actions left
//! 4. Configuration changes only through approved config intents
//! 5. Every lifecycle transition produces a receipt
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use multisig_runtime::{
//!     config_actions, Account, ConfigWitness, InMemoryExtensions, IntentParams,
//! };
//! use multisig_types::{AccountConfig, MemberId};
//!
//! let registry = Arc::new(
//!     InMemoryExtensions::new().with_extension::<ConfigWitness>("0x1", 1),
//! );
//! let alice = MemberId::new("alice");
//! let mut account = Account::new(alice.clone(), AccountConfig::named("ops"), registry).unwrap();
//!
//! let now = Utc::now();
//! let params = IntentParams::new("allow-unverified", now, now + Duration::days(7));
//! config_actions::request_toggle_unverified(&mut account, &alice, params).unwrap();
//!
//! account.approve_intent(&alice, "allow-unverified").unwrap();
//! config_actions::execute_config(&mut account, &alice, "allow-unverified", now).unwrap();
//! assert!(account.unverified_allowed());
//! ```

#![deny(unsafe_code)]

pub mod account;
pub mod action;
pub mod config_actions;
pub mod executable;
pub mod extensions;
pub mod intent;
pub mod witness;

// Re-export main types for convenience
pub use account::{Account, AccountSnapshot, SYSTEM_ACTOR};
pub use action::Action;
pub use config_actions::{ConfigWitness, RulesChange};
pub use executable::{Executable, Expired, FinishError};
pub use extensions::{ExtensionsRegistry, InMemoryExtensions};
pub use intent::{Approval, Intent, IntentOutcome, IntentParams, IntentStatus, IntentSummary};
pub use witness::{ModuleTag, Witness};
