//! Capability Engine
//!
//! Pure function from a user's role in a space to a capability set over
//! (action, subject) pairs. The policy is a static lookup table; there is no
//! runtime rule registration and no I/O. Grants are computed per request and
//! per space, and are recomputed for every space boundary an operation
//! crosses — a grant must never be reused after a mutation that might change
//! membership.

use crate::models::SpaceRole;
use serde::{Deserialize, Serialize};

/// Actions a grant can allow within a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceAction {
    Read,
    Create,
    Edit,
    Delete,
    Manage,
}

/// Subjects an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceSubject {
    Space,
    Page,
    Member,
}

/// Minimum role tier required for an (action, subject) pair.
///
/// Page content work (create/edit/delete drafts) is Writer-tier; structural
/// lifecycle control (trash, restore, permanent deletion) and anything
/// touching the space itself or its membership is Admin-tier.
fn required_role(action: SpaceAction, subject: SpaceSubject) -> SpaceRole {
    use SpaceAction::*;
    use SpaceSubject::*;

    match (subject, action) {
        (_, Read) => SpaceRole::Reader,
        (Page, Create) | (Page, Edit) | (Page, Delete) => SpaceRole::Writer,
        (Page, Manage) => SpaceRole::Admin,
        (Space, _) | (Member, _) => SpaceRole::Admin,
    }
}

/// A per-request, per-space computed capability set.
///
/// Produced by [`CapabilityGrant::for_role`] from the requesting user's
/// membership in the target space. An absent membership yields a grant that
/// denies everything; public/guest access policies live outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityGrant {
    role: Option<SpaceRole>,
}

impl CapabilityGrant {
    /// Build a grant from a membership lookup result
    pub fn for_role(role: Option<SpaceRole>) -> Self {
        Self { role }
    }

    /// A grant that denies every action
    pub fn denied() -> Self {
        Self { role: None }
    }

    /// True iff the member's role tier dominates the minimum tier required
    /// for `(action, subject)`
    pub fn can(&self, action: SpaceAction, subject: SpaceSubject) -> bool {
        match self.role {
            Some(role) => role >= required_role(action, subject),
            None => false,
        }
    }

    /// Negation of [`can`](Self::can); reads like the call sites in the
    /// boundary flow ("if grant.cannot(Edit, Page) return Forbidden")
    pub fn cannot(&self, action: SpaceAction, subject: SpaceSubject) -> bool {
        !self.can(action, subject)
    }

    /// The underlying role, if any
    pub fn role(&self) -> Option<SpaceRole> {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_membership_denies_everything() {
        let grant = CapabilityGrant::for_role(None);
        for action in [
            SpaceAction::Read,
            SpaceAction::Create,
            SpaceAction::Edit,
            SpaceAction::Delete,
            SpaceAction::Manage,
        ] {
            for subject in [SpaceSubject::Space, SpaceSubject::Page, SpaceSubject::Member] {
                assert!(grant.cannot(action, subject));
            }
        }
    }

    #[test]
    fn test_reader_is_read_only() {
        let grant = CapabilityGrant::for_role(Some(SpaceRole::Reader));
        assert!(grant.can(SpaceAction::Read, SpaceSubject::Page));
        assert!(grant.can(SpaceAction::Read, SpaceSubject::Space));
        assert!(grant.cannot(SpaceAction::Create, SpaceSubject::Page));
        assert!(grant.cannot(SpaceAction::Edit, SpaceSubject::Page));
        assert!(grant.cannot(SpaceAction::Manage, SpaceSubject::Page));
    }

    #[test]
    fn test_writer_edits_pages_but_cannot_manage() {
        let grant = CapabilityGrant::for_role(Some(SpaceRole::Writer));
        assert!(grant.can(SpaceAction::Create, SpaceSubject::Page));
        assert!(grant.can(SpaceAction::Edit, SpaceSubject::Page));
        assert!(grant.can(SpaceAction::Delete, SpaceSubject::Page));
        assert!(grant.cannot(SpaceAction::Manage, SpaceSubject::Page));
        assert!(grant.cannot(SpaceAction::Edit, SpaceSubject::Space));
        assert!(grant.cannot(SpaceAction::Create, SpaceSubject::Member));
    }

    #[test]
    fn test_admin_is_superset_of_writer() {
        let admin = CapabilityGrant::for_role(Some(SpaceRole::Admin));
        let writer = CapabilityGrant::for_role(Some(SpaceRole::Writer));
        for action in [
            SpaceAction::Read,
            SpaceAction::Create,
            SpaceAction::Edit,
            SpaceAction::Delete,
            SpaceAction::Manage,
        ] {
            for subject in [SpaceSubject::Space, SpaceSubject::Page, SpaceSubject::Member] {
                if writer.can(action, subject) {
                    assert!(admin.can(action, subject), "admin must dominate writer");
                }
            }
        }
        assert!(admin.can(SpaceAction::Manage, SpaceSubject::Page));
        assert!(admin.can(SpaceAction::Manage, SpaceSubject::Member));
    }
}
