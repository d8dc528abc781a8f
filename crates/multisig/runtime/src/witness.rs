//! Module witnesses
//!
//! A witness is a zero-sized type a module defines with a private field, so
//! only that module can produce a value of it. Holding `&W` proves the call
//! comes from the module that owns `W`. Intents record the [`ModuleTag`] of
//! the witness that created them, and every later attach, drain, delete or
//! finish must present the same witness type.

use multisig_types::{MultisigError, MultisigResult, Role};
use std::any::TypeId;

/// Implemented by a module's witness type.
///
/// `MODULE` is the module's name as it appears in account deps. Accounts
/// only create intents for the witness type the name was published with, so
/// the name also serves as the role whose members' weight counts toward
/// role-path approval of the module's intents.
pub trait Witness: 'static {
    const MODULE: &'static str;
}

/// Identity of the module owning an intent
#[derive(Clone, Copy, Debug)]
pub struct ModuleTag {
    name: &'static str,
    type_id: TypeId,
}

impl ModuleTag {
    pub fn of<W: Witness>() -> Self {
        Self {
            name: W::MODULE,
            type_id: TypeId::of::<W>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The role consulted for role-weighted approval
    pub fn role(&self) -> Role {
        Role::new(self.name)
    }

    /// Whether `W` is the witness this tag was minted from
    pub fn is<W: Witness>(&self) -> bool {
        self.type_id == TypeId::of::<W>()
    }

    pub(crate) fn check<W: Witness>(&self, _witness: &W) -> MultisigResult<()> {
        if self.is::<W>() {
            Ok(())
        } else {
            Err(MultisigError::WrongModule {
                expected: self.name.to_string(),
                actual: W::MODULE.to_string(),
            })
        }
    }
}

impl PartialEq for ModuleTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModuleTag {}

impl std::fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vault(());
    impl Witness for Vault {
        const MODULE: &'static str = "vault";
    }

    // Same name, different type: must not be mistaken for `Vault`.
    struct Impostor(());
    impl Witness for Impostor {
        const MODULE: &'static str = "vault";
    }

    #[test]
    fn test_tag_identity() {
        let tag = ModuleTag::of::<Vault>();
        assert_eq!(tag.name(), "vault");
        assert_eq!(tag.role(), Role::new("vault"));
        assert!(tag.is::<Vault>());
        assert!(!tag.is::<Impostor>());
        assert_eq!(tag, ModuleTag::of::<Vault>());
        assert_ne!(tag, ModuleTag::of::<Impostor>());
    }

    #[test]
    fn test_check_rejects_other_witness() {
        let tag = ModuleTag::of::<Vault>();
        assert!(tag.check(&Vault(())).is_ok());
        assert_eq!(
            tag.check(&Impostor(())),
            Err(MultisigError::WrongModule {
                expected: "vault".into(),
                actual: "vault".into(),
            })
        );
    }
}
