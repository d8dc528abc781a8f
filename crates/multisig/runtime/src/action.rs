//! Action extension contract and the heterogeneous action stack
//!
//! Action-type modules plug into the engine by implementing [`Action`] for
//! their payload. The engine stores payloads type-erased, in attachment
//! order, and hands them back only at the requested concrete type. A wrong
//! type fails with `TypeMismatch` and leaves the stack untouched.
//!
//! Payload constructors should stay private to the defining module so that
//! only that module decides which intents carry its actions.

use crate::executable::{Executable, Expired};
use crate::intent::Intent;
use crate::witness::Witness;
use multisig_types::{MultisigError, MultisigResult};
use std::any::Any;
use std::collections::VecDeque;

/// A typed effect payload attached to an intent.
///
/// `validate` runs before the payload is taken off the stack, so a rejected
/// payload stays in place and nothing is mutated. `apply` runs only after a
/// successful `validate`; if it still fails, the payload is consumed and
/// `apply` must leave the target unchanged.
pub trait Action: Sized + Send + Sync + 'static {
    /// State the action is applied against
    type Target: ?Sized;
    /// Value produced by applying the action
    type Output;

    fn validate(&self, _target: &Self::Target) -> MultisigResult<()> {
        Ok(())
    }

    fn apply(self, target: &mut Self::Target) -> MultisigResult<Self::Output>;

    /// Release anything the payload reserved, without applying it
    fn cleanup(self) {}

    /// Append this payload to an intent that has not been stored yet
    fn attach<W: Witness>(self, intent: &mut Intent, witness: &W) -> MultisigResult<()> {
        intent.add_action(self, witness)
    }

    /// Take the next action off the capability and apply it
    fn execute<W: Witness>(
        executable: &mut Executable,
        witness: &W,
        target: &mut Self::Target,
    ) -> MultisigResult<Self::Output> {
        executable.peek_action::<Self, W>(witness)?.validate(target)?;
        let action = executable.take_action::<Self, W>(witness)?;
        action.apply(target)
    }

    /// Take the next action off an expired intent and clean it up
    fn delete<W: Witness>(expired: &mut Expired, witness: &W) -> MultisigResult<()> {
        expired.take_action::<Self, W>(witness)?.cleanup();
        Ok(())
    }
}

/// One type-erased payload
pub(crate) struct ActionSlot {
    type_name: &'static str,
    payload: Box<dyn Any + Send + Sync>,
}

impl ActionSlot {
    pub(crate) fn new<A: Action>(action: A) -> Self {
        Self {
            type_name: std::any::type_name::<A>(),
            payload: Box::new(action),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn downcast_ref<A: Action>(&self) -> Option<&A> {
        self.payload.downcast_ref::<A>()
    }
}

impl std::fmt::Debug for ActionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ActionSlot").field(&self.type_name).finish()
    }
}

/// Ordered, drain-once view over an intent's actions
#[derive(Debug, Default)]
pub(crate) struct ActionQueue {
    actions: VecDeque<ActionSlot>,
    cursor: usize,
    total: usize,
}

impl ActionQueue {
    pub(crate) fn new(actions: Vec<ActionSlot>) -> Self {
        let total = actions.len();
        Self {
            actions: actions.into(),
            cursor: 0,
            total,
        }
    }

    /// Index of the next action to be taken
    pub(crate) fn next_index(&self) -> usize {
        self.cursor
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn remaining(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether the next action is an `A`
    pub(crate) fn next_is<A: Action>(&self) -> bool {
        self.actions.front().is_some_and(|slot| slot.payload.is::<A>())
    }

    pub(crate) fn peek<A: Action>(&self) -> MultisigResult<&A> {
        let slot = self
            .actions
            .front()
            .ok_or(MultisigError::NoActionsRemaining(self.total))?;
        slot.payload
            .downcast_ref::<A>()
            .ok_or_else(|| self.mismatch::<A>(slot))
    }

    pub(crate) fn take<A: Action>(&mut self) -> MultisigResult<A> {
        let slot = self
            .actions
            .pop_front()
            .ok_or(MultisigError::NoActionsRemaining(self.total))?;
        match slot.payload.downcast::<A>() {
            Ok(action) => {
                self.cursor += 1;
                Ok(*action)
            }
            Err(payload) => {
                let slot = ActionSlot {
                    type_name: slot.type_name,
                    payload,
                };
                let err = self.mismatch::<A>(&slot);
                self.actions.push_front(slot);
                Err(err)
            }
        }
    }

    fn mismatch<A: Action>(&self, slot: &ActionSlot) -> MultisigError {
        MultisigError::TypeMismatch {
            index: self.cursor,
            expected: std::any::type_name::<A>(),
            found: slot.type_name(),
        }
    }
}
