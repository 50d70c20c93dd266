//! Domain types for common-expense payments.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Amounted, Displayable, Period};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// Lifecycle state of a payment record.
pub enum PaymentStatus {
    Pending,
    Paid,
    UnderReview,
    Rejected,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::UnderReview => "under-review",
            PaymentStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// How the money reached the administration.
pub enum PaymentMethod {
    /// Online payment through the external gateway.
    Gateway,
    /// Bank transfer verified by hand by an administrator.
    ManualTransfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::ManualTransfer => "manual-transfer",
        };
        f.write_str(label)
    }
}

/// One payment attempt of a department for a billing period.
///
/// A (department, period) pair holds at most one authoritative `paid`
/// record; earlier pending or rejected attempts stay in the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub department_id: String,
    pub period: Period,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub status: PaymentStatus,
    /// `None` while the record only represents an expected due; set as soon
    /// as money is actually tendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    /// Transaction reference assigned by the external gateway, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Administrator who verified a manual transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        department_id: impl Into<String>,
        period: Period,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_id: department_id.into(),
            period,
            amount,
            status: PaymentStatus::Pending,
            method: None,
            gateway_ref: None,
            paid_at: None,
            verified_by: None,
            notes: None,
            created_at,
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Returns `true` while the record still awaits a terminal state.
    pub fn in_flight(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Pending | PaymentStatus::UnderReview
        )
    }
}

impl Amounted for Payment {
    fn amount(&self) -> i64 {
        self.amount
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        format!("pay:{} [{}]", self.id, self.status)
    }
}
