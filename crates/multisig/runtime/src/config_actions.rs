//! Built-in config module
//!
//! The only way to change an account's members, thresholds, deps,
//! unverified-deps flag or metadata is an intent owned by this module. Its
//! payload types can only be built here, by the `request_*` functions, so
//! no other module can forge them.
//!
//! Payloads are validated against the account when executed, not when
//! requested: the account may have changed in between. [`execute_config`]
//! stages every action of the intent, in order, against the configuration
//! the earlier ones would leave behind. Only when all of them pass is the
//! intent executed and applied; otherwise the account, its intent store and
//! its journal are left exactly as they were.

use crate::account::{check_trusted, Account};
use crate::action::Action;
use crate::executable::{Executable, Expired, FinishError};
use crate::extensions::ExtensionsRegistry;
use crate::intent::{Intent, IntentParams};
use crate::witness::Witness;
use chrono::{DateTime, Utc};
use multisig_types::{
    Dep, Deps, Member, MemberId, MemberRegistry, MultisigError, MultisigResult, Role,
    ThresholdTable, CORE_MODULE,
};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Proof of the config module. Not constructible outside this module.
pub struct ConfigWitness(());

impl Witness for ConfigWitness {
    const MODULE: &'static str = CORE_MODULE;
}

/// Replacement members and thresholds, given as parallel lists
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RulesChange {
    pub addresses: Vec<MemberId>,
    pub weights: Vec<u64>,
    pub roles: Vec<Vec<Role>>,
    pub global: u64,
    pub role_names: Vec<Role>,
    pub role_thresholds: Vec<u64>,
}

impl RulesChange {
    /// Members only, with a global threshold
    pub fn new(global: u64) -> Self {
        Self {
            global,
            ..Self::default()
        }
    }

    pub fn with_member(
        mut self,
        address: impl Into<MemberId>,
        weight: u64,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.addresses.push(address.into());
        self.weights.push(weight);
        self.roles.push(roles.into_iter().collect());
        self
    }

    pub fn with_role_threshold(mut self, role: impl Into<Role>, threshold: u64) -> Self {
        self.role_names.push(role.into());
        self.role_thresholds.push(threshold);
        self
    }

    /// Build the replacement tables, enforcing every rules invariant
    fn build(&self) -> MultisigResult<(MemberRegistry, ThresholdTable)> {
        if self.addresses.len() != self.weights.len() || self.addresses.len() != self.roles.len()
        {
            return Err(MultisigError::MembersNotSameLength);
        }
        if self.role_names.len() != self.role_thresholds.len() {
            return Err(MultisigError::RolesNotSameLength);
        }

        let mut members = MemberRegistry::new();
        for ((address, weight), roles) in self.addresses.iter().zip(&self.weights).zip(&self.roles)
        {
            let mut member = Member::new(*weight);
            for role in roles {
                member.add_role(role.clone());
            }
            members.add_member(address.clone(), member)?;
        }

        let global = Role::global();
        if self.global == 0 {
            return Err(MultisigError::ThresholdNull(global));
        }
        let total = members.total_weight()?;
        if self.global > total {
            return Err(MultisigError::ThresholdTooHigh {
                role: global,
                threshold: self.global,
                reachable: total,
            });
        }

        let mut thresholds = ThresholdTable::new(self.global);
        let mut seen = HashSet::new();
        let held = members.roles();
        for (role, threshold) in self.role_names.iter().zip(&self.role_thresholds) {
            if role.is_global() || !seen.insert(role) {
                return Err(MultisigError::DuplicateRole(role.clone()));
            }
            if *threshold == 0 {
                return Err(MultisigError::ThresholdNull(role.clone()));
            }
            if !held.contains(role) {
                return Err(MultisigError::RoleDoesntExist(role.clone()));
            }
            let reachable = members.role_weight(role)?;
            if *threshold > reachable {
                return Err(MultisigError::ThresholdTooHigh {
                    role: role.clone(),
                    threshold: *threshold,
                    reachable,
                });
            }
            thresholds.set_threshold(role.clone(), *threshold);
        }

        Ok((members, thresholds))
    }
}

// =========================================================================
// STAGING
// =========================================================================

/// The part of the configuration later payloads validate against, as it
/// would stand after the actions staged so far. Rules and deps payloads
/// replace their tables wholesale, so only the unverified flag carries over.
struct Staged<'a> {
    unverified_allowed: bool,
    extensions: &'a dyn ExtensionsRegistry,
}

impl<'a> Staged<'a> {
    fn of(account: &'a Account) -> Self {
        Self {
            unverified_allowed: account.unverified_allowed(),
            extensions: account.extensions(),
        }
    }
}

/// Validation of a config payload against staged configuration
trait Stage {
    fn stage(&self, staged: &mut Staged<'_>) -> MultisigResult<()>;
}

/// Stage the stored action at `index`, whichever config payload it is
fn stage_at(intent: &Intent, index: usize, staged: &mut Staged<'_>) -> MultisigResult<()> {
    if let Some(action) = intent.action::<ConfigRulesAction>(index) {
        action.stage(staged)
    } else if let Some(action) = intent.action::<ConfigDepsAction>(index) {
        action.stage(staged)
    } else if let Some(action) = intent.action::<ToggleUnverifiedAction>(index) {
        action.stage(staged)
    } else if let Some(action) = intent.action::<ConfigMetadataAction>(index) {
        action.stage(staged)
    } else {
        Err(MultisigError::TypeMismatch {
            index,
            expected: "config action",
            found: intent
                .action_types()
                .get(index)
                .copied()
                .unwrap_or("nothing"),
        })
    }
}

// =========================================================================
// PAYLOADS
// =========================================================================

/// Replace members and thresholds atomically
#[derive(Debug)]
pub struct ConfigRulesAction(RulesChange);

impl Stage for ConfigRulesAction {
    fn stage(&self, _staged: &mut Staged<'_>) -> MultisigResult<()> {
        self.0.build().map(|_| ())
    }
}

impl Action for ConfigRulesAction {
    type Target = Account;
    type Output = ();

    fn validate(&self, account: &Account) -> MultisigResult<()> {
        self.stage(&mut Staged::of(account))
    }

    fn apply(self, account: &mut Account) -> MultisigResult<()> {
        let (members, thresholds) = self.0.build()?;
        account.replace_rules(members, thresholds);
        Ok(())
    }
}

/// Replace the deps table
#[derive(Debug)]
pub struct ConfigDepsAction(Vec<Dep>);

impl ConfigDepsAction {
    /// Current deps with every module the registry knows moved to its
    /// latest version. Unknown modules are kept as they are.
    fn latest(account: &Account) -> Self {
        let deps = account
            .deps()
            .iter()
            .map(|dep| match account.extensions().latest_version(&dep.name) {
                Some((addr, version)) => Dep::new(dep.name.clone(), addr, version),
                None => dep.clone(),
            })
            .collect();
        Self(deps)
    }
}

impl Stage for ConfigDepsAction {
    fn stage(&self, staged: &mut Staged<'_>) -> MultisigResult<()> {
        let deps = Deps::new(self.0.clone())?;
        check_trusted(&deps, staged.extensions, staged.unverified_allowed)
    }
}

impl Action for ConfigDepsAction {
    type Target = Account;
    type Output = ();

    fn validate(&self, account: &Account) -> MultisigResult<()> {
        self.stage(&mut Staged::of(account))
    }

    fn apply(self, account: &mut Account) -> MultisigResult<()> {
        let deps = Deps::new(self.0)?;
        account.check_deps_trusted(&deps)?;
        account.replace_deps(deps);
        Ok(())
    }
}

/// Flip the allow-unverified-deps flag
#[derive(Debug)]
pub struct ToggleUnverifiedAction(());

impl Stage for ToggleUnverifiedAction {
    fn stage(&self, staged: &mut Staged<'_>) -> MultisigResult<()> {
        staged.unverified_allowed = !staged.unverified_allowed;
        Ok(())
    }
}

impl Action for ToggleUnverifiedAction {
    type Target = Account;
    type Output = ();

    fn apply(self, account: &mut Account) -> MultisigResult<()> {
        account.toggle_unverified();
        Ok(())
    }
}

/// Replace the metadata map
#[derive(Debug)]
pub struct ConfigMetadataAction(BTreeMap<String, String>);

// Any map is a valid replacement
impl Stage for ConfigMetadataAction {
    fn stage(&self, _staged: &mut Staged<'_>) -> MultisigResult<()> {
        Ok(())
    }
}

impl Action for ConfigMetadataAction {
    type Target = Account;
    type Output = ();

    fn apply(self, account: &mut Account) -> MultisigResult<()> {
        account.replace_metadata(self.0);
        Ok(())
    }
}

// =========================================================================
// REQUESTS
// =========================================================================

fn request<A: Action>(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
    action: A,
) -> MultisigResult<()> {
    let witness = ConfigWitness(());
    let mut intent = account.create_intent(caller, &witness, params)?;
    action.attach(&mut intent, &witness)?;
    account.insert_intent(intent)
}

/// Request replacing members and thresholds
pub fn request_config_rules(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
    rules: RulesChange,
) -> MultisigResult<()> {
    request(account, caller, params, ConfigRulesAction(rules))
}

/// Request replacing the deps table
pub fn request_config_deps(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
    deps: Vec<Dep>,
) -> MultisigResult<()> {
    request(account, caller, params, ConfigDepsAction(deps))
}

/// Request moving every dep to its latest published version
pub fn request_latest_deps(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
) -> MultisigResult<()> {
    let action = ConfigDepsAction::latest(account);
    request(account, caller, params, action)
}

/// Request flipping the allow-unverified-deps flag
pub fn request_toggle_unverified(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
) -> MultisigResult<()> {
    request(account, caller, params, ToggleUnverifiedAction(()))
}

/// Request replacing the metadata map
pub fn request_config_metadata(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
    metadata: BTreeMap<String, String>,
) -> MultisigResult<()> {
    request(account, caller, params, ConfigMetadataAction(metadata))
}

// =========================================================================
// EXECUTION
// =========================================================================

/// Apply the next config action on the capability, whatever its type
pub fn execute_next(executable: &mut Executable, account: &mut Account) -> MultisigResult<()> {
    let witness = ConfigWitness(());
    if executable.next_is::<ConfigDepsAction>() {
        ConfigDepsAction::execute(executable, &witness, account)
    } else if executable.next_is::<ToggleUnverifiedAction>() {
        ToggleUnverifiedAction::execute(executable, &witness, account)
    } else if executable.next_is::<ConfigMetadataAction>() {
        ConfigMetadataAction::execute(executable, &witness, account)
    } else {
        // Also reports the mismatch or exhaustion for anything else
        ConfigRulesAction::execute(executable, &witness, account)
    }
}

/// Destroy a drained config capability
pub fn finish(executable: Executable) -> Result<(), FinishError<Executable>> {
    executable.finish(&ConfigWitness(()))
}

/// Delete every action of an expired or aborted config intent
pub fn delete_expired(mut expired: Expired) -> Result<(), FinishError<Expired>> {
    let witness = ConfigWitness(());
    while expired.remaining() > 0 {
        let deleted = if expired.next_is::<ConfigDepsAction>() {
            ConfigDepsAction::delete(&mut expired, &witness)
        } else if expired.next_is::<ToggleUnverifiedAction>() {
            ToggleUnverifiedAction::delete(&mut expired, &witness)
        } else if expired.next_is::<ConfigMetadataAction>() {
            ConfigMetadataAction::delete(&mut expired, &witness)
        } else {
            ConfigRulesAction::delete(&mut expired, &witness)
        };
        if let Err(error) = deleted {
            return Err(FinishError {
                value: expired,
                error,
            });
        }
    }
    expired.finish(&witness)
}

/// Execute an approved config intent end to end.
///
/// Every action is staged in order before the intent leaves the store. If
/// the caller may not execute it, or any action fails validation, the error
/// is returned and nothing changes: the intent stays stored with its
/// approvals and no receipt is written.
pub fn execute_config(
    account: &mut Account,
    caller: &MemberId,
    key: &str,
    now: DateTime<Utc>,
) -> MultisigResult<()> {
    let intent = account.intent(key)?;
    let owner = intent.owner();
    if !owner.is::<ConfigWitness>() {
        return Err(MultisigError::WrongModule {
            expected: owner.name().to_string(),
            actual: CORE_MODULE.to_string(),
        });
    }
    account.execution_path(caller, key, now)?;

    let mut staged = Staged::of(account);
    for index in 0..intent.action_count() {
        if let Err(error) = stage_at(intent, index, &mut staged) {
            warn!(
                account = %account.id(),
                key,
                index,
                error = %error,
                "Config action rejected, intent left pending"
            );
            return Err(error);
        }
    }

    let witness = ConfigWitness(());
    let mut executable = account.execute_intent(caller, key, now)?;
    while executable.remaining() > 0 {
        // Staging passed against the same state, so this only fails on a
        // defect in the payloads above.
        if let Err(error) = execute_next(&mut executable, account) {
            warn!(
                account = %account.id(),
                key,
                index = executable.next_index(),
                error = %error,
                "Config action failed after staging, aborting intent"
            );
            let expired = executable.abort(&witness).map_err(|e| e.error)?;
            delete_expired(expired).map_err(|e| e.error)?;
            return Err(error);
        }
    }
    executable.finish(&witness).map_err(|e| e.error)
}
