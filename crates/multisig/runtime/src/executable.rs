//! Execution capability and expired-action cleanup
//!
//! An [`Executable`] is produced when an approved intent is removed from the
//! store. It owns the intent's actions and hands them out strictly in
//! attachment order, only to the owner module. It is not `Clone`, not
//! serializable, and panics if dropped while actions remain: the only clean
//! ways out are [`Executable::finish`] once every action is consumed, or
//! [`Executable::abort`] to route the rest through cleanup.
//!
//! [`Expired`] carries the actions of an intent deleted after its deadline.
//! Each must be handed to its action type's `delete` before the bag is
//! destroyed; the same drop rule applies.

use crate::action::{Action, ActionQueue, ActionSlot};
use crate::witness::{ModuleTag, Witness};
use multisig_types::{AccountId, MultisigError, MultisigResult};
use tracing::debug;

/// Failure to finish a capability; hands the value back to the caller
#[derive(Debug)]
pub struct FinishError<T> {
    pub value: T,
    pub error: MultisigError,
}

impl<T> FinishError<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: std::fmt::Debug> std::fmt::Display for FinishError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<T: std::fmt::Debug> std::error::Error for FinishError<T> {}

/// Single-use token that drains an executed intent's actions in order
#[derive(Debug)]
#[must_use = "an Executable must be drained and finished"]
pub struct Executable {
    account_id: AccountId,
    key: String,
    owner: ModuleTag,
    queue: ActionQueue,
}

impl Executable {
    pub(crate) fn new(
        account_id: AccountId,
        key: String,
        owner: ModuleTag,
        actions: Vec<ActionSlot>,
    ) -> Self {
        Self {
            account_id,
            key,
            owner,
            queue: ActionQueue::new(actions),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> ModuleTag {
        self.owner
    }

    /// Index of the next action to be taken
    pub fn next_index(&self) -> usize {
        self.queue.next_index()
    }

    pub fn action_count(&self) -> usize {
        self.queue.total()
    }

    pub fn remaining(&self) -> usize {
        self.queue.remaining()
    }

    /// Whether the next action is an `A`
    pub fn next_is<A: Action>(&self) -> bool {
        self.queue.next_is::<A>()
    }

    /// Borrow the next action without consuming it
    pub fn peek_action<A: Action, W: Witness>(&self, witness: &W) -> MultisigResult<&A> {
        self.owner.check(witness)?;
        self.queue.peek::<A>()
    }

    /// Remove the next action and advance the cursor
    pub fn take_action<A: Action, W: Witness>(&mut self, witness: &W) -> MultisigResult<A> {
        self.owner.check(witness)?;
        let action = self.queue.take::<A>()?;
        debug!(
            account = %self.account_id,
            key = %self.key,
            index = self.queue.next_index() - 1,
            "Action taken"
        );
        Ok(action)
    }

    /// Destroy the capability once every action has been consumed
    pub fn finish<W: Witness>(self, witness: &W) -> Result<(), FinishError<Self>> {
        if let Err(error) = self.owner.check(witness) {
            return Err(FinishError { value: self, error });
        }
        if !self.queue.is_drained() {
            let error = MultisigError::ActionsRemaining {
                remaining: self.queue.remaining(),
                total: self.queue.total(),
            };
            return Err(FinishError { value: self, error });
        }
        debug!(account = %self.account_id, key = %self.key, "Executable finished");
        Ok(())
    }

    /// Give up on the remaining actions; they must then be deleted one by one
    pub fn abort<W: Witness>(mut self, witness: &W) -> Result<Expired, FinishError<Self>> {
        if let Err(error) = self.owner.check(witness) {
            return Err(FinishError { value: self, error });
        }
        let queue = std::mem::take(&mut self.queue);
        debug!(
            account = %self.account_id,
            key = %self.key,
            remaining = queue.remaining(),
            "Executable aborted"
        );
        Ok(Expired {
            account_id: self.account_id.clone(),
            key: std::mem::take(&mut self.key),
            owner: self.owner,
            queue,
        })
    }
}

impl Drop for Executable {
    fn drop(&mut self) {
        if !self.queue.is_drained() && !std::thread::panicking() {
            panic!(
                "Executable for intent {} dropped with {} of {} actions unconsumed",
                self.key,
                self.queue.remaining(),
                self.queue.total()
            );
        }
    }
}

/// Actions of an intent removed unexecuted, awaiting type-specific cleanup
#[derive(Debug)]
#[must_use = "expired actions must be deleted and the bag finished"]
pub struct Expired {
    account_id: AccountId,
    key: String,
    owner: ModuleTag,
    queue: ActionQueue,
}

impl Expired {
    pub(crate) fn new(
        account_id: AccountId,
        key: String,
        owner: ModuleTag,
        actions: Vec<ActionSlot>,
    ) -> Self {
        Self {
            account_id,
            key,
            owner,
            queue: ActionQueue::new(actions),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> ModuleTag {
        self.owner
    }

    pub fn next_index(&self) -> usize {
        self.queue.next_index()
    }

    pub fn remaining(&self) -> usize {
        self.queue.remaining()
    }

    pub fn next_is<A: Action>(&self) -> bool {
        self.queue.next_is::<A>()
    }

    pub fn take_action<A: Action, W: Witness>(&mut self, witness: &W) -> MultisigResult<A> {
        self.owner.check(witness)?;
        self.queue.take::<A>()
    }

    /// Destroy the bag once every action has been deleted
    pub fn finish<W: Witness>(self, witness: &W) -> Result<(), FinishError<Self>> {
        if let Err(error) = self.owner.check(witness) {
            return Err(FinishError { value: self, error });
        }
        if !self.queue.is_drained() {
            let error = MultisigError::ActionsRemaining {
                remaining: self.queue.remaining(),
                total: self.queue.total(),
            };
            return Err(FinishError { value: self, error });
        }
        Ok(())
    }
}

impl Drop for Expired {
    fn drop(&mut self) {
        if !self.queue.is_drained() && !std::thread::panicking() {
            panic!(
                "Expired actions of intent {} dropped with {} left to delete",
                self.key,
                self.queue.remaining()
            );
        }
    }
}
