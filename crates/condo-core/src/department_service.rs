//! Administration of condominium units.

use condo_domain::{Actor, Condominium, Department};
use serde::{Deserialize, Serialize};

use crate::{
    access_policy::{AccessPolicy, ResourceRef, WriteAction},
    time::Clock,
    CoreError, CoreResult,
};

/// Residents linked to a unit are capped; the original register book has
/// room for an owner plus four occupants.
pub const MAX_RESIDENTS_PER_DEPARTMENT: usize = 5;

/// Changeset for partial department updates; `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentUpdate {
    pub owner_name: Option<String>,
    pub area_m2: Option<f64>,
    pub active: Option<bool>,
}

/// Validated mutations for [`Department`] entities.
pub struct DepartmentService;

impl DepartmentService {
    /// Registers a new unit with a unique, non-empty id and positive area.
    pub fn register(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        id: &str,
        owner_name: &str,
        area_m2: f64,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::Department { id },
            WriteAction::Create,
        )?;
        if id.trim().is_empty() {
            return Err(CoreError::InvalidInput("department id is empty".into()));
        }
        if condo.department(id).is_some() {
            return Err(CoreError::InvalidInput(format!(
                "department {id} already exists"
            )));
        }
        if area_m2 <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "area must be positive, got {area_m2}"
            )));
        }
        let mut department = Department::new(id, owner_name, area_m2);
        department.created_at = clock.now();
        department.updated_at = department.created_at;
        condo.add_department(department);
        Ok(())
    }

    /// Applies a partial update. Area changes only affect periods allocated
    /// from now on; history is never recomputed.
    pub fn update(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        id: &str,
        changes: DepartmentUpdate,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::Department { id },
            WriteAction::Update,
        )?;
        if let Some(area) = changes.area_m2 {
            if area <= 0.0 {
                return Err(CoreError::InvalidInput(format!(
                    "area must be positive, got {area}"
                )));
            }
        }
        let now = clock.now();
        let department = condo
            .department_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("department {id}")))?;
        if let Some(owner_name) = changes.owner_name {
            department.owner_name = owner_name;
        }
        if let Some(area) = changes.area_m2 {
            department.area_m2 = area;
        }
        if let Some(active) = changes.active {
            department.active = active;
        }
        department.updated_at = now;
        condo.touch();
        Ok(())
    }

    /// Takes a unit out of billing. Departments are never deleted; payments
    /// and expense history keep referencing them.
    pub fn deactivate(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        id: &str,
    ) -> CoreResult<()> {
        Self::update(
            condo,
            actor,
            clock,
            id,
            DepartmentUpdate {
                active: Some(false),
                ..DepartmentUpdate::default()
            },
        )
    }

    /// Links a user to a unit, keeping both sides of the association in
    /// sync. Capped at [`MAX_RESIDENTS_PER_DEPARTMENT`].
    pub fn assign_resident(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        department_id: &str,
        user_id: &str,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::Department { id: department_id },
            WriteAction::Update,
        )?;
        if condo.user(user_id).is_none() {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        let now = clock.now();
        let department = condo
            .department_mut(department_id)
            .ok_or_else(|| CoreError::NotFound(format!("department {department_id}")))?;
        if department.has_resident(user_id) {
            return Err(CoreError::InvalidInput(format!(
                "user {user_id} is already a resident of {department_id}"
            )));
        }
        if department.resident_ids.len() >= MAX_RESIDENTS_PER_DEPARTMENT {
            return Err(CoreError::InvalidInput(format!(
                "department {department_id} already has {MAX_RESIDENTS_PER_DEPARTMENT} residents"
            )));
        }
        department.resident_ids.push(user_id.to_owned());
        department.updated_at = now;
        if let Some(user) = condo.user_mut(user_id) {
            user.department_id = Some(department_id.to_owned());
        }
        condo.touch();
        Ok(())
    }

    /// Reads one unit through the access policy, without leaking existence
    /// to actors outside it.
    pub fn get<'a>(
        condo: &'a Condominium,
        actor: &Actor,
        id: &str,
    ) -> CoreResult<&'a Department> {
        AccessPolicy::authorize_read(actor, &ResourceRef::Department { id })?;
        condo
            .department(id)
            .ok_or_else(|| CoreError::NotFound(format!("department {id}")))
    }

    pub fn list(condo: &Condominium) -> Vec<&Department> {
        condo.departments.iter().collect()
    }

    /// Billable floor area: the sum over active departments.
    pub fn total_active_area(condo: &Condominium) -> f64 {
        condo.total_active_area()
    }
}
