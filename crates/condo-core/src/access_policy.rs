//! Role-based access decisions over entity references.
//!
//! Checks run against the *reference* (department id, user id), never the
//! entity itself, so callers can authorize before looking anything up and a
//! denied request leaks nothing about existence.

use condo_domain::Actor;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Reference to the entity an actor wants to touch.
pub enum ResourceRef<'a> {
    User { id: &'a str },
    Department { id: &'a str },
    MonthlyExpense,
    ExtraordinaryExpense,
    Payment { department_id: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Distinguishes creating a new record from updating an existing one.
pub enum WriteAction {
    Create,
    Update,
}

/// Stateless policy decisions for administrators and residents.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Returns `true` when the actor may read the referenced entity.
    ///
    /// Administrators read everything. Residents read their own user
    /// profile, their own department, every expense sheet, and only the
    /// payments of their own department.
    pub fn can_read(actor: &Actor, resource: &ResourceRef<'_>) -> bool {
        if actor.is_admin {
            return true;
        }
        match resource {
            ResourceRef::User { id } => actor.id == *id,
            ResourceRef::Department { id } => actor.belongs_to(id),
            ResourceRef::MonthlyExpense | ResourceRef::ExtraordinaryExpense => true,
            ResourceRef::Payment { department_id } => actor.belongs_to(department_id),
        }
    }

    /// Returns `true` when the actor may perform the write.
    ///
    /// Administrators write everything. The only resident write is creating
    /// a payment for their own department; updates stay admin-only.
    pub fn can_write(actor: &Actor, resource: &ResourceRef<'_>, action: WriteAction) -> bool {
        if actor.is_admin {
            return true;
        }
        match (resource, action) {
            (ResourceRef::Payment { department_id }, WriteAction::Create) => {
                actor.belongs_to(department_id)
            }
            _ => false,
        }
    }

    pub fn authorize_read(actor: &Actor, resource: &ResourceRef<'_>) -> CoreResult<()> {
        if Self::can_read(actor, resource) {
            Ok(())
        } else {
            Err(CoreError::Forbidden)
        }
    }

    pub fn authorize_write(
        actor: &Actor,
        resource: &ResourceRef<'_>,
        action: WriteAction,
    ) -> CoreResult<()> {
        if Self::can_write(actor, resource, action) {
            Ok(())
        } else {
            Err(CoreError::Forbidden)
        }
    }
}
