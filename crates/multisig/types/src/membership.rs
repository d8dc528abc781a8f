//! Member registry: who belongs to an account
//!
//! The registry maps member identity to a weight and a role set. It is the
//! source of truth for "who's in" and for the weight sums thresholds are
//! checked against. It does NOT make decisions.

use crate::{MemberId, MultisigError, MultisigResult, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single member of an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Approval weight. Zero-weight members are allowed but contribute nothing.
    pub weight: u64,
    /// Roles held by this member
    pub roles: BTreeSet<Role>,
}

impl Member {
    pub fn new(weight: u64) -> Self {
        Self {
            weight,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Check if the member has a specific role
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Add a role to this member (idempotent)
    pub fn add_role(&mut self, role: Role) {
        self.roles.insert(role);
    }

    /// Remove a role from this member
    pub fn remove_role(&mut self, role: &Role) {
        self.roles.remove(role);
    }
}

/// The member registry of an account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistry {
    members: BTreeMap<MemberId, Member>,
}

impl MemberRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new member
    pub fn add_member(&mut self, id: MemberId, member: Member) -> MultisigResult<()> {
        if self.members.contains_key(&id) {
            return Err(MultisigError::DuplicateMember(id));
        }
        self.members.insert(id, member);
        Ok(())
    }

    /// Remove a member, returning its record
    pub fn remove_member(&mut self, id: &MemberId) -> MultisigResult<Member> {
        self.members
            .remove(id)
            .ok_or_else(|| MultisigError::MemberNotFound(id.clone()))
    }

    pub fn set_weight(&mut self, id: &MemberId, weight: u64) -> MultisigResult<()> {
        self.member_mut(id)?.weight = weight;
        Ok(())
    }

    pub fn add_roles(
        &mut self,
        id: &MemberId,
        roles: impl IntoIterator<Item = Role>,
    ) -> MultisigResult<()> {
        let member = self.member_mut(id)?;
        for role in roles {
            member.add_role(role);
        }
        Ok(())
    }

    pub fn remove_roles<'a>(
        &mut self,
        id: &MemberId,
        roles: impl IntoIterator<Item = &'a Role>,
    ) -> MultisigResult<()> {
        let member = self.member_mut(id)?;
        for role in roles {
            member.remove_role(role);
        }
        Ok(())
    }

    /// Check if an identity is a member
    pub fn is_member(&self, id: &MemberId) -> bool {
        self.members.contains_key(id)
    }

    /// Get a member record
    pub fn member(&self, id: &MemberId) -> MultisigResult<&Member> {
        self.members
            .get(id)
            .ok_or_else(|| MultisigError::MemberNotFound(id.clone()))
    }

    fn member_mut(&mut self, id: &MemberId) -> MultisigResult<&mut Member> {
        self.members
            .get_mut(id)
            .ok_or_else(|| MultisigError::MemberNotFound(id.clone()))
    }

    /// Sum of all member weights, failing if it does not fit in a u64
    pub fn total_weight(&self) -> MultisigResult<u64> {
        sum_weights(self.members.values(), &Role::global())
    }

    /// Sum of weights of members holding `role`
    pub fn role_weight(&self, role: &Role) -> MultisigResult<u64> {
        sum_weights(self.members.values().filter(|m| m.has_role(role)), role)
    }

    /// Identities of all members holding `role`
    pub fn members_with_role(&self, role: &Role) -> Vec<&MemberId> {
        self.members
            .iter()
            .filter(|(_, m)| m.has_role(role))
            .map(|(id, _)| id)
            .collect()
    }

    /// Every role held by at least one member
    pub fn roles(&self) -> BTreeSet<&Role> {
        self.members.values().flat_map(|m| m.roles.iter()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &Member)> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn sum_weights<'a>(
    mut members: impl Iterator<Item = &'a Member>,
    role: &Role,
) -> MultisigResult<u64> {
    members.try_fold(0u64, |sum, m| {
        sum.checked_add(m.weight)
            .ok_or_else(|| MultisigError::WeightOverflow(role.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    #[test]
    fn test_add_member() {
        let mut registry = MemberRegistry::new();
        registry.add_member(id("alice"), Member::new(2)).unwrap();

        assert!(registry.is_member(&id("alice")));
        assert_eq!(registry.member(&id("alice")).unwrap().weight, 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_member() {
        let mut registry = MemberRegistry::new();
        registry.add_member(id("alice"), Member::new(1)).unwrap();
        let result = registry.add_member(id("alice"), Member::new(1));
        assert_eq!(result, Err(MultisigError::DuplicateMember(id("alice"))));
    }

    #[test]
    fn test_missing_member() {
        let registry = MemberRegistry::new();
        assert_eq!(
            registry.member(&id("ghost")),
            Err(MultisigError::MemberNotFound(id("ghost")))
        );
    }

    #[test]
    fn test_weights_by_role() {
        let mut registry = MemberRegistry::new();
        let treasury = Role::new("treasury");
        registry
            .add_member(id("alice"), Member::new(2).with_role("treasury"))
            .unwrap();
        registry
            .add_member(id("bob"), Member::new(3).with_role("treasury"))
            .unwrap();
        registry.add_member(id("carol"), Member::new(5)).unwrap();

        assert_eq!(registry.total_weight(), Ok(10));
        assert_eq!(registry.role_weight(&treasury), Ok(5));
        assert_eq!(registry.members_with_role(&treasury).len(), 2);
        assert_eq!(registry.role_weight(&Role::new("nobody")), Ok(0));
    }

    #[test]
    fn test_weight_sums_do_not_wrap() {
        let mut registry = MemberRegistry::new();
        let treasury = Role::new("treasury");
        registry
            .add_member(id("alice"), Member::new(u64::MAX).with_role("treasury"))
            .unwrap();
        registry.add_member(id("bob"), Member::new(1)).unwrap();

        assert_eq!(
            registry.total_weight(),
            Err(MultisigError::WeightOverflow(Role::global()))
        );
        // bob does not hold the role, so the role sum still fits
        assert_eq!(registry.role_weight(&treasury), Ok(u64::MAX));

        registry.add_roles(&id("bob"), [treasury.clone()]).unwrap();
        assert_eq!(
            registry.role_weight(&treasury),
            Err(MultisigError::WeightOverflow(treasury))
        );
    }

    #[test]
    fn test_mutations() {
        let mut registry = MemberRegistry::new();
        registry.add_member(id("alice"), Member::new(1)).unwrap();

        registry.set_weight(&id("alice"), 4).unwrap();
        registry
            .add_roles(&id("alice"), [Role::new("a"), Role::new("b")])
            .unwrap();
        registry.remove_roles(&id("alice"), [&Role::new("a")]).unwrap();

        let alice = registry.member(&id("alice")).unwrap();
        assert_eq!(alice.weight, 4);
        assert!(alice.has_role(&Role::new("b")));
        assert!(!alice.has_role(&Role::new("a")));

        registry.remove_member(&id("alice")).unwrap();
        assert!(registry.is_empty());
        assert!(registry.set_weight(&id("alice"), 1).is_err());
    }

    #[test]
    fn test_member_role_management() {
        let mut member = Member::new(1);
        let role = Role::new("admin");

        assert!(!member.has_role(&role));
        member.add_role(role.clone());
        member.add_role(role.clone());
        assert_eq!(member.roles.len(), 1);

        member.remove_role(&role);
        assert!(!member.has_role(&role));
    }
}
