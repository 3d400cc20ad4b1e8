//! Entity trait: identity + ownership across state changes.

use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that belongs to exactly one user for its whole lifetime.
pub trait Owned {
    fn owner_id(&self) -> UserId;

    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id() == user
    }

    /// Reads are owner-scoped: another owner's record does not exist.
    fn ensure_visible_to(&self, user: UserId) -> DomainResult<()> {
        if self.is_owned_by(user) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note(UserId);

    impl Owned for Note {
        fn owner_id(&self) -> UserId {
            self.0
        }
    }

    #[test]
    fn foreign_records_are_not_found() {
        let owner = UserId::new();
        let note = Note(owner);
        assert!(note.ensure_visible_to(owner).is_ok());
        assert_eq!(note.ensure_visible_to(UserId::new()), Err(DomainError::NotFound));
    }
}
