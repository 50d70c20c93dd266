//! Administration of mirrored user profiles.

use condo_domain::{Actor, Condominium, Role, User};
use serde::{Deserialize, Serialize};

use crate::{
    access_policy::{AccessPolicy, ResourceRef, WriteAction},
    time::Clock,
    CoreError, CoreResult,
};

/// Changeset for partial profile updates; `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub department_id: Option<Option<String>>,
    pub role: Option<Role>,
    pub is_admin: Option<bool>,
}

/// Validated mutations for mirrored [`User`] profiles. The identity
/// provider owns the account lifecycle; this service only keeps the mirror
/// coherent.
pub struct UserService;

impl UserService {
    /// Mirrors a newly provisioned user. Ids and emails stay unique and the
    /// admin flag must agree with the role.
    pub fn register(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        mut user: User,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::User { id: &user.id },
            WriteAction::Create,
        )?;
        if user.id.trim().is_empty() {
            return Err(CoreError::InvalidInput("user id is empty".into()));
        }
        if condo.user(&user.id).is_some() {
            return Err(CoreError::InvalidInput(format!(
                "user {} already exists",
                user.id
            )));
        }
        let email = user.email.trim().to_ascii_lowercase();
        if condo
            .users
            .iter()
            .any(|existing| existing.email.trim().to_ascii_lowercase() == email)
        {
            return Err(CoreError::InvalidInput(format!(
                "email {} is already registered",
                user.email
            )));
        }
        if !user.flags_consistent() {
            return Err(CoreError::InvalidInput(format!(
                "user {} admin flag disagrees with role {}",
                user.id, user.role
            )));
        }
        if user.registered_at.is_none() {
            user.registered_at = Some(clock.now());
        }
        condo.add_user(user);
        Ok(())
    }

    /// Applies a partial profile update, re-checking role consistency on
    /// the result.
    pub fn update_profile(
        condo: &mut Condominium,
        actor: &Actor,
        id: &str,
        changes: UserUpdate,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(actor, &ResourceRef::User { id }, WriteAction::Update)?;
        if let Some(Some(department_id)) = &changes.department_id {
            if condo.department(department_id).is_none() {
                return Err(CoreError::NotFound(format!("department {department_id}")));
            }
        }
        let user = condo
            .user_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("user {id}")))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(department_id) = changes.department_id {
            user.department_id = department_id;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_admin) = changes.is_admin {
            user.is_admin = is_admin;
        }
        if !user.flags_consistent() {
            return Err(CoreError::InvalidInput(format!(
                "user {id} admin flag disagrees with role"
            )));
        }
        condo.touch();
        Ok(())
    }

    /// Reads one profile through the access policy: residents only see
    /// themselves, and a denied id never reveals whether it exists.
    pub fn get<'a>(condo: &'a Condominium, actor: &Actor, id: &str) -> CoreResult<&'a User> {
        AccessPolicy::authorize_read(actor, &ResourceRef::User { id })?;
        condo
            .user(id)
            .ok_or_else(|| CoreError::NotFound(format!("user {id}")))
    }

    pub fn list<'a>(condo: &'a Condominium, actor: &Actor) -> CoreResult<Vec<&'a User>> {
        if !actor.is_admin {
            return Err(CoreError::Forbidden);
        }
        Ok(condo.users.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use condo_domain::Department;

    fn admin() -> Actor {
        Actor::new("admin-1", None, true)
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap())
    }

    #[test]
    fn register_enforces_uniqueness_and_consistency() {
        let mut condo = Condominium::new("Edificio Mirador");
        let user = User::new("uid-1", "ana@example.com", "Ana");
        UserService::register(&mut condo, &admin(), &clock(), user.clone())
            .expect("first mirror");
        assert!(
            UserService::register(&mut condo, &admin(), &clock(), user).is_err(),
            "duplicate id"
        );

        let mut dup_email = User::new("uid-2", "ANA@example.com", "Ana Dos");
        assert!(
            UserService::register(&mut condo, &admin(), &clock(), dup_email.clone()).is_err(),
            "duplicate email, case-insensitive"
        );

        dup_email.email = "otra@example.com".into();
        dup_email.is_admin = true; // role still Tenant
        let err = UserService::register(&mut condo, &admin(), &clock(), dup_email)
            .expect_err("inconsistent flags");
        assert!(matches!(err, CoreError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn update_validates_department_reference() {
        let mut condo = Condominium::new("Edificio Mirador");
        condo.add_department(Department::new("DEPTO-101", "Ana", 50.0));
        UserService::register(
            &mut condo,
            &admin(),
            &clock(),
            User::new("uid-1", "ana@example.com", "Ana"),
        )
        .unwrap();

        let err = UserService::update_profile(
            &mut condo,
            &admin(),
            "uid-1",
            UserUpdate {
                department_id: Some(Some("DEPTO-999".into())),
                ..UserUpdate::default()
            },
        )
        .expect_err("unknown department");
        assert!(matches!(err, CoreError::NotFound(_)), "got {err:?}");

        UserService::update_profile(
            &mut condo,
            &admin(),
            "uid-1",
            UserUpdate {
                department_id: Some(Some("DEPTO-101".into())),
                ..UserUpdate::default()
            },
        )
        .expect("valid link");
        assert_eq!(
            condo.user("uid-1").unwrap().department_id.as_deref(),
            Some("DEPTO-101")
        );
    }

    #[test]
    fn profile_reads_are_scoped() {
        let mut condo = Condominium::new("Edificio Mirador");
        UserService::register(
            &mut condo,
            &admin(),
            &clock(),
            User::new("uid-1", "ana@example.com", "Ana"),
        )
        .unwrap();

        let me = Actor::new("uid-1", None, false);
        assert!(UserService::get(&condo, &me, "uid-1").is_ok());

        let other = Actor::new("uid-2", None, false);
        let err = UserService::get(&condo, &other, "uid-1").expect_err("denied");
        assert!(matches!(err, CoreError::Forbidden), "got {err:?}");
        assert!(UserService::list(&condo, &other).is_err());
    }
}
