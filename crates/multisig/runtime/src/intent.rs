//! Intents: pending governance requests
//!
//! An intent bundles an ordered action stack with its approval state. It is
//! built outside the account (actions attached through the [`Action`]
//! contract), then stored, after which its stack is fixed in length and
//! order. Approvals keep `total_weight` and `role_weight` equal to the sums
//! recorded for the current approvers.

use crate::action::{Action, ActionSlot};
use crate::witness::{ModuleTag, Witness};
use chrono::{DateTime, Utc};
use multisig_types::{AccountId, MemberId, MemberRegistry, MultisigError, MultisigResult, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for creating an intent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentParams {
    /// Unique key within the account's intent store
    pub key: String,
    pub description: String,
    /// Earliest time at which the intent may be executed
    pub execution_time: DateTime<Utc>,
    /// Time after which the intent may be deleted unexecuted
    pub expiration: DateTime<Utc>,
}

impl IntentParams {
    pub fn new(
        key: impl Into<String>,
        execution_time: DateTime<Utc>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            description: String::new(),
            execution_time,
            expiration,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Weight one approver contributed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub weight: u64,
    /// Whether the approver held the owner module's role when approving
    pub counts_for_role: bool,
}

/// Lifecycle position of a stored intent, evaluated at a given time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentStatus {
    /// Accumulating approvals
    Open,
    /// Threshold met, execution time not yet reached
    Approved,
    /// Threshold met and execution time reached
    Executable,
    /// Past expiration; may be deleted
    Expired,
}

/// Approval outcome of an intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentOutcome {
    pub approvals: Vec<MemberId>,
    pub total_weight: u64,
    pub role_weight: u64,
}

/// Serializable view of a stored intent, without its payloads
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentSummary {
    pub key: String,
    pub module: String,
    pub description: String,
    pub creator: MemberId,
    pub execution_time: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub action_types: Vec<String>,
    pub outcome: IntentOutcome,
}

/// A pending governance request
#[derive(Debug)]
pub struct Intent {
    account_id: AccountId,
    key: String,
    owner: ModuleTag,
    description: String,
    creator: MemberId,
    execution_time: DateTime<Utc>,
    expiration: DateTime<Utc>,
    actions: Vec<ActionSlot>,
    max_actions: usize,
    approvals: BTreeMap<MemberId, Approval>,
    total_weight: u64,
    role_weight: u64,
}

impl Intent {
    pub(crate) fn new(
        account_id: AccountId,
        params: IntentParams,
        owner: ModuleTag,
        creator: MemberId,
        max_actions: usize,
    ) -> Self {
        Self {
            account_id,
            key: params.key,
            owner,
            description: params.description,
            creator,
            execution_time: params.execution_time,
            expiration: params.expiration,
            actions: Vec::new(),
            max_actions,
            approvals: BTreeMap::new(),
            total_weight: 0,
            role_weight: 0,
        }
    }

    /// Append an action. Only the owner module may attach.
    pub fn add_action<A: Action, W: Witness>(
        &mut self,
        action: A,
        witness: &W,
    ) -> MultisigResult<()> {
        self.owner.check(witness)?;
        if self.max_actions != 0 && self.actions.len() >= self.max_actions {
            return Err(MultisigError::TooManyActions {
                limit: self.max_actions,
            });
        }
        self.actions.push(ActionSlot::new(action));
        Ok(())
    }

    /// The account this intent was created for
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> ModuleTag {
        self.owner
    }

    /// The role consulted for role-weighted approval
    pub fn role(&self) -> Role {
        self.owner.role()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn creator(&self) -> &MemberId {
        &self.creator
    }

    pub fn execution_time(&self) -> DateTime<Utc> {
        self.execution_time
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn action_types(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.type_name()).collect()
    }

    /// Stored action at `index`, if it is an `A`. Read-only; the stack
    /// stays intact.
    pub(crate) fn action<A: Action>(&self, index: usize) -> Option<&A> {
        self.actions.get(index).and_then(|slot| slot.downcast_ref::<A>())
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn role_weight(&self) -> u64 {
        self.role_weight
    }

    pub fn has_approved(&self, member: &MemberId) -> bool {
        self.approvals.contains_key(member)
    }

    pub fn approvals(&self) -> impl Iterator<Item = (&MemberId, &Approval)> {
        self.approvals.iter()
    }

    pub fn outcome(&self) -> IntentOutcome {
        IntentOutcome {
            approvals: self.approvals.keys().cloned().collect(),
            total_weight: self.total_weight,
            role_weight: self.role_weight,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    pub fn summary(&self) -> IntentSummary {
        IntentSummary {
            key: self.key.clone(),
            module: self.owner.name().to_string(),
            description: self.description.clone(),
            creator: self.creator.clone(),
            execution_time: self.execution_time,
            expiration: self.expiration,
            action_types: self
                .action_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            outcome: self.outcome(),
        }
    }

    pub(crate) fn approve(&mut self, member: MemberId, approval: Approval) -> MultisigResult<()> {
        if self.approvals.contains_key(&member) {
            return Err(MultisigError::AlreadyApproved {
                key: self.key.clone(),
                member,
            });
        }
        let (total_weight, role_weight) = self.add_weights(approval)?;
        self.total_weight = total_weight;
        self.role_weight = role_weight;
        self.approvals.insert(member, approval);
        Ok(())
    }

    pub(crate) fn revoke(&mut self, member: &MemberId) -> MultisigResult<Approval> {
        let approval =
            self.approvals
                .remove(member)
                .ok_or_else(|| MultisigError::NotApproved {
                    key: self.key.clone(),
                    member: member.clone(),
                })?;
        // Sums only ever hold recorded approvals, so these cannot underflow
        self.total_weight -= approval.weight;
        if approval.counts_for_role {
            self.role_weight -= approval.weight;
        }
        Ok(approval)
    }

    /// Re-derive every approval from the current members.
    ///
    /// Approvers who are no longer members are dropped; the rest contribute
    /// their current weight, counting for the role only if they still hold
    /// it. Returns the identities dropped.
    pub(crate) fn reweigh(&mut self, members: &MemberRegistry) -> Vec<MemberId> {
        let role = self.role();
        let previous = std::mem::take(&mut self.approvals);
        self.total_weight = 0;
        self.role_weight = 0;

        let mut dropped = Vec::new();
        for (id, _) in previous {
            let Ok(member) = members.member(&id) else {
                dropped.push(id);
                continue;
            };
            let approval = Approval {
                weight: member.weight,
                counts_for_role: member.has_role(&role),
            };
            // A registry whose sums overflow never passes validation
            match self.add_weights(approval) {
                Ok((total_weight, role_weight)) => {
                    self.total_weight = total_weight;
                    self.role_weight = role_weight;
                    self.approvals.insert(id, approval);
                }
                Err(_) => dropped.push(id),
            }
        }
        dropped
    }

    fn add_weights(&self, approval: Approval) -> MultisigResult<(u64, u64)> {
        let total_weight = self
            .total_weight
            .checked_add(approval.weight)
            .ok_or_else(|| MultisigError::WeightOverflow(Role::global()))?;
        let role_weight = if approval.counts_for_role {
            self.role_weight
                .checked_add(approval.weight)
                .ok_or_else(|| MultisigError::WeightOverflow(self.role()))?
        } else {
            self.role_weight
        };
        Ok((total_weight, role_weight))
    }

    pub(crate) fn into_actions(self) -> Vec<ActionSlot> {
        self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Vault(());
    impl Witness for Vault {
        const MODULE: &'static str = "vault";
    }

    struct Other(());
    impl Witness for Other {
        const MODULE: &'static str = "other";
    }

    struct Ping;
    impl Action for Ping {
        type Target = ();
        type Output = ();
        fn apply(self, _target: &mut ()) -> MultisigResult<()> {
            Ok(())
        }
    }

    fn intent(max_actions: usize) -> Intent {
        let now = Utc::now();
        Intent::new(
            AccountId::new("acct"),
            IntentParams::new("k", now, now + Duration::days(1)).with_description("d"),
            ModuleTag::of::<Vault>(),
            MemberId::new("alice"),
            max_actions,
        )
    }

    fn approval(weight: u64, counts_for_role: bool) -> Approval {
        Approval {
            weight,
            counts_for_role,
        }
    }

    #[test]
    fn test_attach_requires_owner() {
        let mut intent = intent(0);
        Ping.attach(&mut intent, &Vault(())).unwrap();
        assert!(matches!(
            Ping.attach(&mut intent, &Other(())),
            Err(MultisigError::WrongModule { .. })
        ));
        assert_eq!(intent.action_count(), 1);
        assert_eq!(intent.role(), Role::new("vault"));
    }

    #[test]
    fn test_action_limit() {
        let mut intent = intent(2);
        intent.add_action(Ping, &Vault(())).unwrap();
        intent.add_action(Ping, &Vault(())).unwrap();
        assert_eq!(
            intent.add_action(Ping, &Vault(())),
            Err(MultisigError::TooManyActions { limit: 2 })
        );
    }

    #[test]
    fn test_approve_and_revoke_keep_weights() {
        let mut intent = intent(0);
        intent.approve(MemberId::new("a"), approval(2, true)).unwrap();
        intent.approve(MemberId::new("b"), approval(3, false)).unwrap();
        assert_eq!(intent.total_weight(), 5);
        assert_eq!(intent.role_weight(), 2);

        assert!(matches!(
            intent.approve(MemberId::new("a"), approval(2, true)),
            Err(MultisigError::AlreadyApproved { .. })
        ));

        intent.revoke(&MemberId::new("a")).unwrap();
        assert_eq!(intent.total_weight(), 3);
        assert_eq!(intent.role_weight(), 0);
        assert!(matches!(
            intent.revoke(&MemberId::new("a")),
            Err(MultisigError::NotApproved { .. })
        ));
    }

    #[test]
    fn test_approve_rejects_overflowing_weight() {
        let mut intent = intent(0);
        intent
            .approve(MemberId::new("a"), approval(u64::MAX, true))
            .unwrap();
        assert_eq!(
            intent.approve(MemberId::new("b"), approval(1, false)),
            Err(MultisigError::WeightOverflow(Role::global()))
        );
        assert!(!intent.has_approved(&MemberId::new("b")));
        assert_eq!(intent.total_weight(), u64::MAX);
        assert_eq!(intent.role_weight(), u64::MAX);
    }

    #[test]
    fn test_reweigh_follows_current_members() {
        use multisig_types::Member;

        let mut intent = intent(0);
        intent.approve(MemberId::new("a"), approval(2, true)).unwrap();
        intent.approve(MemberId::new("b"), approval(3, false)).unwrap();
        intent.approve(MemberId::new("c"), approval(4, true)).unwrap();

        // a loses the role and gains weight, b gains the role, c is removed
        let mut members = MemberRegistry::new();
        members.add_member(MemberId::new("a"), Member::new(5)).unwrap();
        members
            .add_member(MemberId::new("b"), Member::new(3).with_role("vault"))
            .unwrap();

        let dropped = intent.reweigh(&members);
        assert_eq!(dropped, vec![MemberId::new("c")]);
        assert_eq!(intent.total_weight(), 8);
        assert_eq!(intent.role_weight(), 3);
        assert!(!intent.has_approved(&MemberId::new("c")));

        // Revoking still subtracts exactly what is now recorded
        intent.revoke(&MemberId::new("a")).unwrap();
        assert_eq!(intent.total_weight(), 3);
        assert_eq!(intent.role_weight(), 3);
    }

    #[test]
    fn test_summary() {
        let mut intent = intent(0);
        intent.add_action(Ping, &Vault(())).unwrap();
        intent.approve(MemberId::new("a"), approval(1, false)).unwrap();

        let summary = intent.summary();
        assert_eq!(summary.module, "vault");
        assert_eq!(summary.action_types.len(), 1);
        assert!(summary.action_types[0].ends_with("Ping"));
        assert_eq!(summary.outcome.approvals, vec![MemberId::new("a")]);
    }
}
