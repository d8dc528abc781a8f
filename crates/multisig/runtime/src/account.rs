//! Account: the governed aggregate
//!
//! An account owns its members, thresholds, deps and intent store. Members
//! create, approve and execute intents; configuration only changes through
//! intents owned by the config module (see [`crate::config_actions`]).

use crate::config_actions::ConfigWitness;
use crate::executable::{Executable, Expired};
use crate::extensions::ExtensionsRegistry;
use crate::intent::{Approval, Intent, IntentParams, IntentStatus, IntentSummary};
use crate::witness::{ModuleTag, Witness};
use chrono::{DateTime, Utc};
use multisig_types::{
    AccountConfig, AccountId, AccountReceipt, AuditJournal, Dep, Deps, Member, MemberId,
    MemberRegistry, MultisigError, MultisigResult, ReceiptType, Role, ThresholdTable,
    CORE_MODULE,
};
use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Actor recorded on receipts that no member triggered
pub const SYSTEM_ACTOR: &str = "system";

/// Serializable view of an account's state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub metadata: BTreeMap<String, String>,
    pub members: MemberRegistry,
    pub thresholds: ThresholdTable,
    pub deps: Deps,
    pub allow_unverified_deps: bool,
    pub intents: Vec<IntentSummary>,
}

/// A multi-party governed account
pub struct Account {
    id: AccountId,
    config: AccountConfig,
    metadata: BTreeMap<String, String>,
    members: MemberRegistry,
    thresholds: ThresholdTable,
    deps: Deps,
    unverified_allowed: bool,
    intents: BTreeMap<String, Intent>,
    extensions: Arc<dyn ExtensionsRegistry>,
    journal: AuditJournal,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("members", &self.members)
            .field("thresholds", &self.thresholds)
            .field("deps", &self.deps)
            .field("intents", &self.intents.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Account {
    /// Create an account depending only on the latest published core module.
    ///
    /// The creator becomes the sole member with weight 1 and the global role;
    /// the global threshold is 1.
    pub fn new(
        creator: MemberId,
        config: AccountConfig,
        extensions: Arc<dyn ExtensionsRegistry>,
    ) -> MultisigResult<Self> {
        let (addr, version) = extensions
            .latest_version(CORE_MODULE)
            .ok_or_else(|| MultisigError::DepNotFound(CORE_MODULE.to_string()))?;
        Self::with_deps(
            creator,
            config,
            extensions,
            vec![Dep::new(CORE_MODULE, addr, version)],
        )
    }

    /// Create an account with an explicit initial deps table
    pub fn with_deps(
        creator: MemberId,
        config: AccountConfig,
        extensions: Arc<dyn ExtensionsRegistry>,
        deps: Vec<Dep>,
    ) -> MultisigResult<Self> {
        let deps = Deps::new(deps)?;
        check_trusted(&deps, extensions.as_ref(), config.allow_unverified_deps)?;

        let id = AccountId::generate();
        let mut members = MemberRegistry::new();
        members.add_member(creator.clone(), Member::new(1).with_role(Role::global()))?;

        let mut metadata = BTreeMap::new();
        if !config.name.is_empty() {
            metadata.insert("name".to_string(), config.name.clone());
        }

        info!(account = %id, creator = %creator, deps = deps.len(), "Account created");

        let mut journal = AuditJournal::new(id.clone());
        journal.log_receipt(AccountReceipt::new(
            id.clone(),
            ReceiptType::AccountCreated,
            creator,
            format!("Account created: {}", config.name),
        ));

        Ok(Self {
            id,
            unverified_allowed: config.allow_unverified_deps,
            config,
            metadata,
            members,
            thresholds: ThresholdTable::new(1),
            deps,
            intents: BTreeMap::new(),
            extensions,
            journal,
        })
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn members(&self) -> &MemberRegistry {
        &self.members
    }

    pub fn member(&self, id: &MemberId) -> MultisigResult<&Member> {
        self.members.member(id)
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.members.is_member(id)
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn threshold(&self, role: &Role) -> MultisigResult<u64> {
        self.thresholds.threshold(role)
    }

    pub fn deps(&self) -> &Deps {
        &self.deps
    }

    pub fn unverified_allowed(&self) -> bool {
        self.unverified_allowed
    }

    pub fn extensions(&self) -> &dyn ExtensionsRegistry {
        self.extensions.as_ref()
    }

    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    pub fn intent(&self, key: &str) -> MultisigResult<&Intent> {
        self.intents
            .get(key)
            .ok_or_else(|| MultisigError::ProposalNotFound(key.to_string()))
    }

    pub fn intent_keys(&self) -> impl Iterator<Item = &str> {
        self.intents.keys().map(String::as_str)
    }

    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id.clone(),
            metadata: self.metadata.clone(),
            members: self.members.clone(),
            thresholds: self.thresholds.clone(),
            deps: self.deps.clone(),
            allow_unverified_deps: self.unverified_allowed,
            intents: self.intents.values().map(Intent::summary).collect(),
        }
    }

    // =========================================================================
    // INTENT LIFECYCLE
    // =========================================================================

    /// Start an intent owned by module `W`.
    ///
    /// `W` must be a dep, and the witness the registry published under that
    /// name; the core module is always [`ConfigWitness`]. The intent is
    /// returned unstored so the module can attach its actions, then handed
    /// back through [`Account::insert_intent`].
    pub fn create_intent<W: Witness>(
        &self,
        caller: &MemberId,
        _witness: &W,
        params: IntentParams,
    ) -> MultisigResult<Intent> {
        self.ensure_member(caller)?;
        let dep = self.deps.get(W::MODULE)?;
        self.admit::<W>(dep)?;

        if params.key.len() > self.config.max_key_len {
            return Err(MultisigError::KeyTooLong {
                len: params.key.len(),
                limit: self.config.max_key_len,
            });
        }
        if params.execution_time > params.expiration {
            return Err(MultisigError::InvalidWindow {
                execution_time: params.execution_time,
                expiration: params.expiration,
            });
        }
        if self.intents.contains_key(&params.key) {
            return Err(MultisigError::KeyAlreadyExists(params.key));
        }

        Ok(Intent::new(
            self.id.clone(),
            params,
            ModuleTag::of::<W>(),
            caller.clone(),
            self.config.max_actions_per_intent,
        ))
    }

    /// Store a built intent. From here on its actions are fixed.
    pub fn insert_intent(&mut self, intent: Intent) -> MultisigResult<()> {
        if intent.account_id() != &self.id {
            return Err(MultisigError::WrongAccount {
                expected: intent.account_id().to_string(),
                actual: self.id.to_string(),
            });
        }
        if self.intents.contains_key(intent.key()) {
            return Err(MultisigError::KeyAlreadyExists(intent.key().to_string()));
        }
        if intent.action_count() == 0 {
            return Err(MultisigError::EmptyIntent(intent.key().to_string()));
        }

        info!(
            account = %self.id,
            key = intent.key(),
            module = %intent.owner(),
            actions = intent.action_count(),
            "Intent created"
        );
        self.journal.log_receipt(
            AccountReceipt::new(
                self.id.clone(),
                ReceiptType::IntentCreated,
                intent.creator().clone(),
                format!("Intent created: {}", intent.key()),
            )
            .with_metadata("key", intent.key())
            .with_metadata("module", intent.owner().name())
            .with_metadata("actions", intent.action_count().to_string()),
        );

        self.intents.insert(intent.key().to_string(), intent);
        Ok(())
    }

    /// Record the caller's approval with their current weight
    pub fn approve_intent(&mut self, caller: &MemberId, key: &str) -> MultisigResult<()> {
        let member = self
            .members
            .member(caller)
            .map_err(|_| MultisigError::NotAMember(caller.clone()))?;
        let intent = self
            .intents
            .get_mut(key)
            .ok_or_else(|| MultisigError::ProposalNotFound(key.to_string()))?;

        let approval = Approval {
            weight: member.weight,
            counts_for_role: member.has_role(&intent.role()),
        };
        intent.approve(caller.clone(), approval)?;
        let (total_weight, role_weight) = (intent.total_weight(), intent.role_weight());

        debug!(
            account = %self.id,
            key,
            member = %caller,
            weight = approval.weight,
            total_weight,
            role_weight,
            "Intent approved"
        );
        self.journal.log_receipt(
            AccountReceipt::new(
                self.id.clone(),
                ReceiptType::IntentApproved,
                caller.clone(),
                format!("Approved intent: {}", key),
            )
            .with_metadata("key", key)
            .with_metadata("weight", approval.weight.to_string()),
        );
        Ok(())
    }

    /// Withdraw the caller's approval, subtracting exactly what was added
    pub fn revoke_intent(&mut self, caller: &MemberId, key: &str) -> MultisigResult<()> {
        self.ensure_member(caller)?;
        let intent = self
            .intents
            .get_mut(key)
            .ok_or_else(|| MultisigError::ProposalNotFound(key.to_string()))?;

        let approval = intent.revoke(caller)?;

        debug!(
            account = %self.id,
            key,
            member = %caller,
            weight = approval.weight,
            "Approval revoked"
        );
        self.journal.log_receipt(
            AccountReceipt::new(
                self.id.clone(),
                ReceiptType::IntentRevoked,
                caller.clone(),
                format!("Revoked approval: {}", key),
            )
            .with_metadata("key", key)
            .with_metadata("weight", approval.weight.to_string()),
        );
        Ok(())
    }

    /// Whether the intent's approvals meet the global or its role threshold
    pub fn is_approved(&self, key: &str) -> MultisigResult<bool> {
        let intent = self.intent(key)?;
        Ok(self.meets_global(intent) || self.meets_role(intent))
    }

    /// Remove an approved intent from the store and hand out its actions.
    ///
    /// Passes on total weight against the global threshold, or on role
    /// weight against the owner role's threshold when the caller holds that
    /// role. Expiration is not checked here.
    pub fn execute_intent(
        &mut self,
        caller: &MemberId,
        key: &str,
        now: DateTime<Utc>,
    ) -> MultisigResult<Executable> {
        let path = self.execution_path(caller, key, now)?;

        let intent = self
            .intents
            .remove(key)
            .ok_or_else(|| MultisigError::ProposalNotFound(key.to_string()))?;

        info!(
            account = %self.id,
            key,
            module = %intent.owner(),
            executor = %caller,
            path,
            "Intent executed"
        );
        self.journal.log_receipt(
            AccountReceipt::new(
                self.id.clone(),
                ReceiptType::IntentExecuted,
                caller.clone(),
                format!("Executed intent: {}", key),
            )
            .at(now)
            .with_metadata("key", key)
            .with_metadata("path", path),
        );

        let owner = intent.owner();
        Ok(Executable::new(
            self.id.clone(),
            key.to_string(),
            owner,
            intent.into_actions(),
        ))
    }

    /// Run every check [`Account::execute_intent`] makes without removing
    /// anything. Returns the threshold path that passes.
    pub(crate) fn execution_path(
        &self,
        caller: &MemberId,
        key: &str,
        now: DateTime<Utc>,
    ) -> MultisigResult<&'static str> {
        let member = self
            .members
            .member(caller)
            .map_err(|_| MultisigError::NotAMember(caller.clone()))?;
        let intent = self.intent(key)?;

        if now < intent.execution_time() {
            return Err(MultisigError::TooEarly {
                execution_time: intent.execution_time(),
                now,
            });
        }

        if self.meets_global(intent) {
            return Ok("global");
        }
        if member.has_role(&intent.role()) && self.meets_role(intent) {
            return Ok("role");
        }
        warn!(
            account = %self.id,
            key,
            total_weight = intent.total_weight(),
            role_weight = intent.role_weight(),
            "Execution rejected: threshold not met"
        );
        Err(MultisigError::ThresholdNotMet {
            total_weight: intent.total_weight(),
            global_threshold: self.thresholds.global(),
            role_weight: intent.role_weight(),
        })
    }

    /// Remove an intent past its expiration, regardless of approvals.
    ///
    /// No membership is required; the returned actions must be deleted by
    /// the owner module.
    pub fn delete_expired_intent(
        &mut self,
        key: &str,
        now: DateTime<Utc>,
    ) -> MultisigResult<Expired> {
        let intent = self.intent(key)?;
        if !intent.is_expired(now) {
            return Err(MultisigError::NotYetExpired {
                expiration: intent.expiration(),
                now,
            });
        }

        let intent = self
            .intents
            .remove(key)
            .ok_or_else(|| MultisigError::ProposalNotFound(key.to_string()))?;

        info!(account = %self.id, key, module = %intent.owner(), "Expired intent deleted");
        self.journal.log_receipt(
            AccountReceipt::new(
                self.id.clone(),
                ReceiptType::IntentDeleted,
                MemberId::new(SYSTEM_ACTOR),
                format!("Deleted expired intent: {}", key),
            )
            .at(now)
            .with_metadata("key", key),
        );

        let owner = intent.owner();
        Ok(Expired::new(
            self.id.clone(),
            key.to_string(),
            owner,
            intent.into_actions(),
        ))
    }

    /// Where a stored intent sits in its lifecycle at `now`
    pub fn intent_status(&self, key: &str, now: DateTime<Utc>) -> MultisigResult<IntentStatus> {
        let intent = self.intent(key)?;
        if intent.is_expired(now) {
            return Ok(IntentStatus::Expired);
        }
        if !(self.meets_global(intent) || self.meets_role(intent)) {
            return Ok(IntentStatus::Open);
        }
        if now < intent.execution_time() {
            Ok(IntentStatus::Approved)
        } else {
            Ok(IntentStatus::Executable)
        }
    }

    // =========================================================================
    // GOVERNED MUTATIONS (config actions only)
    // =========================================================================

    pub(crate) fn replace_rules(&mut self, members: MemberRegistry, thresholds: ThresholdTable) {
        info!(
            account = %self.id,
            members = members.len(),
            global_threshold = thresholds.global(),
            "Rules changed"
        );
        self.members = members;
        self.thresholds = thresholds;
        self.log_config_receipt(ReceiptType::RulesChanged, "Members and thresholds replaced");

        // Pending approvals follow the new rules
        for intent in self.intents.values_mut() {
            let before = (intent.total_weight(), intent.role_weight());
            let dropped = intent.reweigh(&self.members);
            if before != (intent.total_weight(), intent.role_weight()) {
                debug!(
                    account = %self.id,
                    key = intent.key(),
                    dropped = dropped.len(),
                    total_weight = intent.total_weight(),
                    role_weight = intent.role_weight(),
                    "Pending approvals reweighed"
                );
            }
        }
    }

    pub(crate) fn replace_deps(&mut self, deps: Deps) {
        info!(account = %self.id, deps = deps.len(), "Deps changed");
        self.deps = deps;
        self.log_config_receipt(ReceiptType::DepsChanged, "Deps replaced");
    }

    pub(crate) fn toggle_unverified(&mut self) {
        self.unverified_allowed = !self.unverified_allowed;
        info!(
            account = %self.id,
            allowed = self.unverified_allowed,
            "Unverified deps toggled"
        );
        let description = format!("Unverified deps allowed: {}", self.unverified_allowed);
        self.log_config_receipt(ReceiptType::UnverifiedToggled, description);
    }

    pub(crate) fn replace_metadata(&mut self, metadata: BTreeMap<String, String>) {
        debug!(account = %self.id, entries = metadata.len(), "Metadata changed");
        self.metadata = metadata;
        self.log_config_receipt(ReceiptType::MetadataChanged, "Metadata replaced");
    }

    /// Trust check against the registry, honoring the unverified flag
    pub(crate) fn check_deps_trusted(&self, deps: &Deps) -> MultisigResult<()> {
        check_trusted(deps, self.extensions.as_ref(), self.unverified_allowed)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Admit `W` as the module published under `dep`'s name
    fn admit<W: Witness>(&self, dep: &Dep) -> MultisigResult<()> {
        let published = if dep.name == CORE_MODULE {
            Some(TypeId::of::<ConfigWitness>())
        } else {
            self.extensions.witness(&dep.name)
        };
        match published {
            Some(witness) if witness == TypeId::of::<W>() => Ok(()),
            Some(_) => {
                warn!(
                    account = %self.id,
                    module = W::MODULE,
                    witness = type_name::<W>(),
                    "Witness is not the one published for this module"
                );
                Err(MultisigError::WrongModule {
                    expected: dep.name.clone(),
                    actual: type_name::<W>().to_string(),
                })
            }
            // Unpublished deps are taken at their name only while allowed
            None if self.unverified_allowed => Ok(()),
            None => Err(MultisigError::DepNotTrusted {
                name: dep.name.clone(),
                version: dep.version,
            }),
        }
    }

    fn ensure_member(&self, caller: &MemberId) -> MultisigResult<()> {
        if !self.members.is_member(caller) {
            return Err(MultisigError::NotAMember(caller.clone()));
        }
        Ok(())
    }

    fn meets_global(&self, intent: &Intent) -> bool {
        intent.total_weight() >= self.thresholds.global()
    }

    fn meets_role(&self, intent: &Intent) -> bool {
        self.thresholds
            .get(&intent.role())
            .is_some_and(|threshold| intent.role_weight() >= threshold)
    }

    fn log_config_receipt(&mut self, receipt_type: ReceiptType, description: impl Into<String>) {
        self.journal.log_receipt(AccountReceipt::new(
            self.id.clone(),
            receipt_type,
            MemberId::new(CORE_MODULE),
            description,
        ));
    }
}

pub(crate) fn check_trusted(
    deps: &Deps,
    extensions: &dyn ExtensionsRegistry,
    allow_unverified: bool,
) -> MultisigResult<()> {
    if allow_unverified {
        return Ok(());
    }
    for dep in deps.iter() {
        if !extensions.is_trusted(&dep.name, &dep.addr, dep.version) {
            warn!(dep = %dep, "Dependency not trusted");
            return Err(MultisigError::DepNotTrusted {
                name: dep.name.clone(),
                version: dep.version,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::extensions::InMemoryExtensions;
    use chrono::Duration;

    struct Vault(());
    impl Witness for Vault {
        const MODULE: &'static str = "vault";
    }

    struct Unlisted(());
    impl Witness for Unlisted {
        const MODULE: &'static str = "unlisted";
    }

    struct FakeConfig(());
    impl Witness for FakeConfig {
        const MODULE: &'static str = "config";
    }

    struct Mint(());
    impl Witness for Mint {
        const MODULE: &'static str = "mint";
    }

    struct Ping;
    impl Action for Ping {
        type Target = ();
        type Output = ();
        fn apply(self, _target: &mut ()) -> MultisigResult<()> {
            Ok(())
        }
    }

    fn alice() -> MemberId {
        MemberId::new("alice")
    }

    fn registry() -> Arc<InMemoryExtensions> {
        Arc::new(
            InMemoryExtensions::new()
                .with_extension::<ConfigWitness>("0x1", 1)
                .with_extension::<Vault>("0x2", 1),
        )
    }

    fn account() -> Account {
        Account::with_deps(
            alice(),
            AccountConfig::named("treasury"),
            registry(),
            vec![Dep::new("config", "0x1", 1), Dep::new("vault", "0x2", 1)],
        )
        .unwrap()
    }

    fn stored(account: &mut Account, key: &str, now: DateTime<Utc>) {
        let mut intent = account
            .create_intent(
                &alice(),
                &Vault(()),
                IntentParams::new(key, now, now + Duration::days(1)),
            )
            .unwrap();
        Ping.attach(&mut intent, &Vault(())).unwrap();
        account.insert_intent(intent).unwrap();
    }

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new(alice(), AccountConfig::named("t"), registry()).unwrap();
        assert_eq!(account.thresholds().global(), 1);
        assert_eq!(account.member(&alice()).unwrap().weight, 1);
        assert!(account.member(&alice()).unwrap().has_role(&Role::global()));
        assert_eq!(account.deps().get("config").unwrap().version, 1);
        assert_eq!(account.metadata().get("name").map(String::as_str), Some("t"));
        assert_eq!(
            account
                .journal()
                .receipts_of_type(&ReceiptType::AccountCreated)
                .len(),
            1
        );
    }

    #[test]
    fn test_new_requires_core_in_registry() {
        let empty = Arc::new(InMemoryExtensions::new());
        assert_eq!(
            Account::new(alice(), AccountConfig::default(), empty).unwrap_err(),
            MultisigError::DepNotFound("config".into())
        );
    }

    #[test]
    fn test_untrusted_initial_deps() {
        let err = Account::with_deps(
            alice(),
            AccountConfig::default(),
            registry(),
            vec![Dep::new("config", "0x1", 1), Dep::new("mint", "0x9", 1)],
        )
        .unwrap_err();
        assert!(matches!(err, MultisigError::DepNotTrusted { .. }));

        Account::with_deps(
            alice(),
            AccountConfig::default().with_unverified_deps(true),
            registry(),
            vec![Dep::new("config", "0x1", 1), Dep::new("mint", "0x9", 1)],
        )
        .unwrap();
    }

    #[test]
    fn test_create_checks() {
        let account = account();
        let now = Utc::now();
        let params = IntentParams::new("k", now, now + Duration::days(1));

        assert!(matches!(
            account.create_intent(&MemberId::new("eve"), &Vault(()), params.clone()),
            Err(MultisigError::NotAMember(_))
        ));
        assert!(matches!(
            account.create_intent(&alice(), &Unlisted(()), params.clone()),
            Err(MultisigError::DepNotFound(_))
        ));
        assert!(matches!(
            account.create_intent(
                &alice(),
                &Vault(()),
                IntentParams::new("k", now + Duration::days(2), now + Duration::days(1)),
            ),
            Err(MultisigError::InvalidWindow { .. })
        ));
        assert!(matches!(
            account.create_intent(
                &alice(),
                &Vault(()),
                IntentParams::new("k".repeat(129), now, now),
            ),
            Err(MultisigError::KeyTooLong { len: 129, .. })
        ));
    }

    #[test]
    fn test_create_admits_only_published_witness() {
        let account = account();
        let now = Utc::now();
        let params = IntentParams::new("k", now, now + Duration::days(1));

        assert!(matches!(
            account.create_intent(&alice(), &FakeConfig(()), params.clone()),
            Err(MultisigError::WrongModule { expected, .. }) if expected == "config"
        ));
        assert!(account
            .create_intent(&alice(), &Vault(()), params.clone())
            .is_ok());
    }

    #[test]
    fn test_unpublished_dep_admitted_only_when_unverified_allowed() {
        let deps = vec![Dep::new("config", "0x1", 1), Dep::new("mint", "0x9", 1)];
        let account = Account::with_deps(
            alice(),
            AccountConfig::default().with_unverified_deps(true),
            registry(),
            deps,
        )
        .unwrap();
        let now = Utc::now();
        let params = IntentParams::new("k", now, now + Duration::days(1));
        assert!(account.create_intent(&alice(), &Mint(()), params).is_ok());
    }

    #[test]
    fn test_insert_rejects_empty_and_duplicate() {
        let mut account = account();
        let now = Utc::now();
        let empty = account
            .create_intent(&alice(), &Vault(()), IntentParams::new("k", now, now))
            .unwrap();
        assert!(matches!(
            account.insert_intent(empty),
            Err(MultisigError::EmptyIntent(_))
        ));

        stored(&mut account, "k", now);
        assert!(matches!(
            account.create_intent(&alice(), &Vault(()), IntentParams::new("k", now, now)),
            Err(MultisigError::KeyAlreadyExists(_))
        ));
    }

    #[test]
    fn test_insert_into_other_account() {
        let mut first = account();
        let mut second = account();
        let now = Utc::now();
        let mut intent = first
            .create_intent(&alice(), &Vault(()), IntentParams::new("k", now, now))
            .unwrap();
        Ping.attach(&mut intent, &Vault(())).unwrap();

        assert!(matches!(
            second.insert_intent(intent),
            Err(MultisigError::WrongAccount { .. })
        ));
        assert_eq!(second.intent_count(), 0);
        assert_eq!(first.intent_count(), 0);
        stored(&mut first, "k", now);
        assert_eq!(first.intent_count(), 1);
    }

    #[test]
    fn test_status_progression() {
        let mut account = account();
        let now = Utc::now();
        let mut intent = account
            .create_intent(
                &alice(),
                &Vault(()),
                IntentParams::new("k", now + Duration::hours(1), now + Duration::hours(2)),
            )
            .unwrap();
        Ping.attach(&mut intent, &Vault(())).unwrap();
        account.insert_intent(intent).unwrap();

        assert_eq!(account.intent_status("k", now).unwrap(), IntentStatus::Open);
        account.approve_intent(&alice(), "k").unwrap();
        assert_eq!(account.intent_status("k", now).unwrap(), IntentStatus::Approved);
        assert_eq!(
            account
                .intent_status("k", now + Duration::minutes(90))
                .unwrap(),
            IntentStatus::Executable
        );
        assert_eq!(
            account.intent_status("k", now + Duration::hours(2)).unwrap(),
            IntentStatus::Expired
        );
    }

    #[test]
    fn test_execute_removes_intent() {
        let mut account = account();
        let now = Utc::now();
        stored(&mut account, "k", now);
        account.approve_intent(&alice(), "k").unwrap();

        let mut exec = account.execute_intent(&alice(), "k", now).unwrap();
        assert!(account.intent("k").is_err());
        Ping::execute(&mut exec, &Vault(()), &mut ()).unwrap();
        exec.finish(&Vault(())).unwrap();

        assert!(matches!(
            account.execute_intent(&alice(), "k", now),
            Err(MultisigError::ProposalNotFound(_))
        ));
    }

    #[test]
    fn test_delete_expired() {
        let mut account = account();
        let now = Utc::now();
        stored(&mut account, "k", now);

        assert!(matches!(
            account.delete_expired_intent("k", now),
            Err(MultisigError::NotYetExpired { .. })
        ));
        let mut expired = account
            .delete_expired_intent("k", now + Duration::days(1))
            .unwrap();
        Ping::delete(&mut expired, &Vault(())).unwrap();
        expired.finish(&Vault(())).unwrap();

        let deleted = account
            .journal()
            .receipts_of_type(&ReceiptType::IntentDeleted);
        assert_eq!(deleted[0].actor, MemberId::new(SYSTEM_ACTOR));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut account = account();
        stored(&mut account, "k", Utc::now());
        let snapshot = account.snapshot();
        assert_eq!(snapshot.intents.len(), 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: AccountSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.members, *account.members());
        assert_eq!(back.deps, *account.deps());
    }
}
