//! Domain types for mirrored identity-provider users and request actors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// Role of a user within the condominium.
pub enum Role {
    Admin,
    Owner,
    Tenant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Tenant => "tenant",
        };
        f.write_str(label)
    }
}

/// Profile attributes mirrored from the external identity provider.
/// Account lifecycle (creation, credentials, deletion) lives there, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Identity-provider uid.
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    pub role: Role,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            department_id: None,
            role: Role::Tenant,
            is_admin: false,
            registered_at: None,
        }
    }

    /// The `is_admin` flag must agree with the role.
    pub fn flags_consistent(&self) -> bool {
        self.is_admin == matches!(self.role, Role::Admin)
    }
}

impl Identifiable for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The authenticated principal of a request, passed explicitly into every
/// policy check. Built at the authentication boundary; the core keeps no
/// ambient current-user state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>, department_id: Option<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            department_id,
            is_admin,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            department_id: user.department_id.clone(),
            is_admin: user.is_admin,
        }
    }

    /// Returns `true` when the actor is linked to the given department.
    pub fn belongs_to(&self, department_id: &str) -> bool {
        self.department_id.as_deref() == Some(department_id)
    }
}
