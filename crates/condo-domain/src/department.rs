//! Domain types for condominium units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{Displayable, Identifiable};

/// A single unit of the condominium, billed by floor area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: String,
    pub owner_name: String,
    /// Floor area in square meters. Must stay positive; historical periods
    /// are never recomputed after an area change.
    pub area_m2: f64,
    /// Cached due from the latest monthly allocation, in the smallest
    /// currency unit.
    #[serde(default)]
    pub monthly_due: i64,
    /// Identity-provider ids of the residents linked to this unit, in
    /// assignment order.
    #[serde(default)]
    pub resident_ids: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Department {
    pub fn new(id: impl Into<String>, owner_name: impl Into<String>, area_m2: f64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner_name: owner_name.into(),
            area_m2,
            monthly_due: 0,
            resident_ids: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the given user is linked to this unit.
    pub fn has_resident(&self, user_id: &str) -> bool {
        self.resident_ids.iter().any(|id| id == user_id)
    }
}

impl Identifiable for Department {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Department {
    fn display_label(&self) -> String {
        format!("{} ({:.1} m2)", self.id, self.area_m2)
    }
}
