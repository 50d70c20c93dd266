//! Domain types for monthly and extraordinary common expenses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Amounted, Displayable, Period};

/// A single line item inside a monthly expense (water, cleaning staff, …).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseItem {
    pub concept: String,
    /// Amount in the smallest currency unit. Never negative.
    pub amount: i64,
}

impl ExpenseItem {
    pub fn new(concept: impl Into<String>, amount: i64) -> Self {
        Self {
            concept: concept.into(),
            amount,
        }
    }
}

impl Amounted for ExpenseItem {
    fn amount(&self) -> i64 {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Derived totals of one month's expense sheet.
pub struct ExpenseBreakdown {
    /// Sum of all item amounts.
    pub total: i64,
    /// `total / total_area_m2`, kept at full precision. Rounding happens
    /// once per department at allocation time, not here.
    pub rate_per_m2: f64,
}

/// The expense sheet of one billing period. Owns its items exclusively;
/// `total` and `rate_per_m2` are recomputed from the items on every write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyExpense {
    pub period: Period,
    pub items: Vec<ExpenseItem>,
    pub total: i64,
    pub rate_per_m2: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyExpense {
    pub fn new(period: Period, items: Vec<ExpenseItem>, breakdown: ExpenseBreakdown) -> Self {
        let now = Utc::now();
        Self {
            period,
            items,
            total: breakdown.total,
            rate_per_m2: breakdown.rate_per_m2,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn breakdown(&self) -> ExpenseBreakdown {
        ExpenseBreakdown {
            total: self.total,
            rate_per_m2: self.rate_per_m2,
        }
    }
}

impl Displayable for MonthlyExpense {
    fn display_label(&self) -> String {
        format!("{} ({} items)", self.period, self.items.len())
    }
}

/// Per-department payment mark of an extraordinary expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtraordinaryPaymentMark {
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// A one-off expense charged flat per department, independent of area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraordinaryExpense {
    pub id: Uuid,
    pub concept: String,
    pub total_amount: i64,
    pub amount_per_department: i64,
    pub issued_at: DateTime<Utc>,
    /// Payment marks keyed by department id.
    #[serde(default)]
    pub payments: BTreeMap<String, ExtraordinaryPaymentMark>,
}

impl ExtraordinaryExpense {
    pub fn new(
        concept: impl Into<String>,
        total_amount: i64,
        amount_per_department: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            concept: concept.into(),
            total_amount,
            amount_per_department,
            issued_at,
            payments: BTreeMap::new(),
        }
    }

    /// Returns `true` when the given department already settled this charge.
    pub fn is_paid_by(&self, department_id: &str) -> bool {
        self.payments
            .get(department_id)
            .map(|mark| mark.paid)
            .unwrap_or(false)
    }
}

impl Displayable for ExtraordinaryExpense {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.concept, self.id)
    }
}
