//! Authorization Layer
//!
//! Capability-based authorization evaluated per (user, space, action,
//! subject). The engine is pure: the caller fetches the user's membership
//! role from the repository and turns it into a [`CapabilityGrant`] that is
//! valid for exactly one operation on one space.

mod capability;

pub use capability::{CapabilityGrant, SpaceAction, SpaceSubject};
