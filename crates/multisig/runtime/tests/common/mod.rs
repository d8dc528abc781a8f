//! Shared fixtures: a small "vault" module and account builders.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use multisig_runtime::config_actions::{self, RulesChange};
use multisig_runtime::{Account, Action, ConfigWitness, InMemoryExtensions, IntentParams, Witness};
use multisig_types::{AccountConfig, Dep, MemberId, MultisigResult, Role};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Vault module
// ---------------------------------------------------------------------------

pub struct Vault(());

impl Witness for Vault {
    const MODULE: &'static str = "vault";
}

pub fn vault() -> Vault {
    Vault(())
}

/// Target the vault's actions run against
#[derive(Debug, Default)]
pub struct Ledger {
    pub balance: u64,
    pub memos: Vec<String>,
}

#[derive(Debug)]
pub struct Deposit(pub u64);

impl Action for Deposit {
    type Target = Ledger;
    type Output = u64;

    fn apply(self, ledger: &mut Ledger) -> MultisigResult<u64> {
        ledger.balance += self.0;
        Ok(ledger.balance)
    }
}

#[derive(Debug)]
pub struct Memo(pub String);

impl Action for Memo {
    type Target = Ledger;
    type Output = ();

    fn apply(self, ledger: &mut Ledger) -> MultisigResult<()> {
        ledger.memos.push(self.0);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn member(id: &str) -> MemberId {
    MemberId::new(id)
}

pub fn creator() -> MemberId {
    member("alice")
}

pub fn registry() -> Arc<InMemoryExtensions> {
    Arc::new(
        InMemoryExtensions::new()
            .with_extension::<ConfigWitness>("0x1", 1)
            .with_extension::<Vault>("0x2", 1),
    )
}

/// Route engine logs to the test output; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh account owned by `alice`, depending on config and vault
pub fn new_account() -> Account {
    init_tracing();
    Account::with_deps(
        creator(),
        AccountConfig::named("test"),
        registry(),
        vec![Dep::new("config", "0x1", 1), Dep::new("vault", "0x2", 1)],
    )
    .unwrap()
}

/// Account whose rules were replaced by `rules` through a config intent
pub fn governed_account(rules: RulesChange) -> Account {
    let mut account = new_account();
    let now = Utc::now();
    config_actions::request_config_rules(
        &mut account,
        &creator(),
        window("setup", now),
        rules,
    )
    .unwrap();
    account.approve_intent(&creator(), "setup").unwrap();
    config_actions::execute_config(&mut account, &creator(), "setup", now).unwrap();
    account
}

/// Members `(id, weight, roles)` with a global threshold
pub fn rules(members: &[(&str, u64, &[&str])], global: u64) -> RulesChange {
    members
        .iter()
        .fold(RulesChange::new(global), |rules, (id, weight, roles)| {
            rules.with_member(*id, *weight, roles.iter().map(|r| Role::new(*r)))
        })
}

/// Executable immediately, expiring in a day
pub fn window(key: &str, now: DateTime<Utc>) -> IntentParams {
    IntentParams::new(key, now, now + Duration::days(1))
}

/// Store a vault intent carrying one deposit per amount
pub fn propose_deposits(
    account: &mut Account,
    caller: &MemberId,
    params: IntentParams,
    amounts: &[u64],
) -> MultisigResult<()> {
    let mut intent = account.create_intent(caller, &vault(), params)?;
    for amount in amounts {
        Deposit(*amount).attach(&mut intent, &vault())?;
    }
    account.insert_intent(intent)
}
