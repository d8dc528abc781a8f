//! Error types for multisig accounts

use crate::{MemberId, Role};
use chrono::{DateTime, Utc};

/// Errors that can occur in multisig account operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultisigError {
    // --- Authorization ---
    #[error("Caller is not a member: {0}")]
    NotAMember(MemberId),

    #[error("Wrong module: intent owned by {expected}, called by {actual}")]
    WrongModule { expected: String, actual: String },

    #[error("Wrong account: intent built for {expected}, stored into {actual}")]
    WrongAccount { expected: String, actual: String },

    // --- State preconditions ---
    #[error("Proposal not found: {0}")]
    ProposalNotFound(String),

    #[error("Proposal key already exists: {0}")]
    KeyAlreadyExists(String),

    #[error("Member {member} already approved proposal {key}")]
    AlreadyApproved { key: String, member: MemberId },

    #[error("Member {member} has not approved proposal {key}")]
    NotApproved { key: String, member: MemberId },

    #[error("Too early: proposal executable at {execution_time}, now {now}")]
    TooEarly {
        execution_time: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Not yet expired: proposal expires at {expiration}, now {now}")]
    NotYetExpired {
        expiration: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Invalid window: execution time {execution_time} is after expiration {expiration}")]
    InvalidWindow {
        execution_time: DateTime<Utc>,
        expiration: DateTime<Utc>,
    },

    #[error("Proposal {0} has no actions")]
    EmptyIntent(String),

    #[error("Too many actions: limit is {limit}")]
    TooManyActions { limit: usize },

    #[error("Proposal key too long: {len} > {limit}")]
    KeyTooLong { len: usize, limit: usize },

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Role not found: {0}")]
    RoleNotFound(Role),

    // --- Threshold ---
    #[error("Threshold not met: global {total_weight}/{global_threshold}, role {role_weight}")]
    ThresholdNotMet {
        total_weight: u64,
        global_threshold: u64,
        role_weight: u64,
    },

    // --- Configuration validation ---
    #[error("Weight sum for role {0} overflows u64")]
    WeightOverflow(Role),

    #[error("Threshold must be greater than zero for role {0}")]
    ThresholdNull(Role),

    #[error("Threshold too high for role {role}: required {threshold}, reachable {reachable}")]
    ThresholdTooHigh {
        role: Role,
        threshold: u64,
        reachable: u64,
    },

    #[error("Role does not exist among members: {0}")]
    RoleDoesntExist(Role),

    #[error("Members, weights and roles must have the same length")]
    MembersNotSameLength,

    #[error("Role names and role thresholds must have the same length")]
    RolesNotSameLength,

    #[error("Role listed twice or shadowing the global threshold: {0}")]
    DuplicateRole(Role),

    #[error("Duplicate member: {0}")]
    DuplicateMember(MemberId),

    #[error("Dependency not found: {0}")]
    DepNotFound(String),

    #[error("Dependency not trusted by the extensions registry: {name}@{version}")]
    DepNotTrusted { name: String, version: u64 },

    #[error("Duplicate dependency: {0}")]
    DuplicateDep(String),

    #[error("Deps must contain the core module: {0}")]
    MissingCoreDep(String),

    // --- Integrity ---
    #[error("Type mismatch at action {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("No actions remaining: all {0} actions consumed")]
    NoActionsRemaining(usize),

    #[error("Actions remaining: {remaining} of {total} not consumed")]
    ActionsRemaining { remaining: usize, total: usize },
}

/// Taxonomy of failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller or module lacks standing
    Authorization,
    /// Current state does not satisfy the operation's preconditions
    Precondition,
    /// Insufficient aggregated weight
    Threshold,
    /// Malformed configuration-change payload
    Configuration,
    /// Defect in an action-type module
    Integrity,
}

impl MultisigError {
    pub fn category(&self) -> ErrorCategory {
        use MultisigError::*;
        match self {
            NotAMember(_) | WrongModule { .. } | WrongAccount { .. } => {
                ErrorCategory::Authorization
            }
            ProposalNotFound(_)
            | KeyAlreadyExists(_)
            | AlreadyApproved { .. }
            | NotApproved { .. }
            | TooEarly { .. }
            | NotYetExpired { .. }
            | InvalidWindow { .. }
            | EmptyIntent(_)
            | TooManyActions { .. }
            | KeyTooLong { .. }
            | MemberNotFound(_)
            | RoleNotFound(_) => ErrorCategory::Precondition,
            ThresholdNotMet { .. } => ErrorCategory::Threshold,
            ThresholdNull(_)
            | WeightOverflow(_)
            | ThresholdTooHigh { .. }
            | RoleDoesntExist(_)
            | MembersNotSameLength
            | RolesNotSameLength
            | DuplicateRole(_)
            | DuplicateMember(_)
            | DepNotFound(_)
            | DepNotTrusted { .. }
            | DuplicateDep(_)
            | MissingCoreDep(_) => ErrorCategory::Configuration,
            TypeMismatch { .. } | NoActionsRemaining(_) | ActionsRemaining { .. } => {
                ErrorCategory::Integrity
            }
        }
    }

    /// Whether the same call may succeed later without changing its inputs
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Precondition | ErrorCategory::Threshold
        )
    }
}

/// Result type alias for multisig operations
pub type MultisigResult<T> = Result<T, MultisigError>;
