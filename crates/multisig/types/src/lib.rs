//! Multisig Account Domain Types
//!
//! This crate defines the domain types for multisig accounts: groups of
//! weighted members that collectively authorize typed actions by proposing
//! them, approving them against role-scoped thresholds, and executing them.
//!
//! # Key Concepts
//!
//! - **Member Registry**: who belongs to the account, with a weight and a
//!   set of roles each.
//! - **Threshold Table**: approval weight required per role. The reserved
//!   [`Role::global`] entry always exists.
//! - **Deps**: the per-account allow-list of modules that may attach
//!   actions, checked against an external extensions registry.
//! - **Audit Journal**: every lifecycle transition produces a receipt.
//!
//! # Architecture
//!
//! This is a pure types crate. Mutation of the registries happens only
//! through the runtime crate's governance pipeline; nothing here reaches
//! outside its own data. IDs use the newtype pattern and implement
//! `Display` and `new()`.

#![deny(unsafe_code)]

mod account;
mod audit;
mod config;
mod deps;
mod errors;
mod membership;
mod role;
mod threshold;

pub use account::*;
pub use audit::*;
pub use config::*;
pub use deps::*;
pub use errors::*;
pub use membership::*;
pub use role::*;
pub use threshold::*;
