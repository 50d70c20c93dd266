//! Reconciliation of recorded payments against expected dues.
//!
//! Everything here is read-only over the snapshot: standings and portfolio
//! totals are derived on every call and never persisted, so they cannot
//! drift from the underlying records.

use std::fmt;

use condo_domain::{Condominium, Payment, PaymentStatus, Period};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{due_service::DueService, CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// A department's derived payment status for one period.
pub enum Standing {
    Paid,
    Pending,
    UnderReview,
    Rejected,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Standing::Paid => "paid",
            Standing::Pending => "pending",
            Standing::UnderReview => "under-review",
            Standing::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// One department's reconciled row for a period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentStanding {
    pub department_id: String,
    pub due: i64,
    pub standing: Standing,
    /// Amount of the payment that settled the due; zero unless PAID.
    pub settled_amount: i64,
    /// The authoritative paid record, when one exists.
    pub settling_payment: Option<Uuid>,
}

/// Aggregate view across all departments for one period. Derived on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSummary {
    pub period: Period,
    /// Sum of amounts over payments that settle a PAID standing.
    pub collected: i64,
    /// Sum of full dues over departments that are not PAID. Partial
    /// payments do not reduce this figure.
    pub outstanding: i64,
    pub paid_count: usize,
    pub pending_count: usize,
    pub under_review_count: usize,
    pub rejected_count: usize,
    pub standings: Vec<DepartmentStanding>,
}

/// Pure classification of payment histories into standings.
pub struct ReconcileService;

impl ReconcileService {
    /// Derives the standing of one department from its payment records.
    ///
    /// Priority, first match wins: a paid record covering the due wins;
    /// otherwise an under-review record with no later paid record; otherwise
    /// a most-recent rejection; otherwise pending (also the empty case).
    /// A paid record below the due is a partial payment and stays pending.
    pub fn classify(due: i64, payments: &[&Payment]) -> Standing {
        let ordered = Self::most_recent_first(payments);

        if let Some(settling) = Self::settling_payment(due, &ordered) {
            debug_assert!(settling.amount >= due);
            return Standing::Paid;
        }
        for payment in &ordered {
            if payment.status == PaymentStatus::Paid && payment.amount < due {
                tracing::warn!(
                    payment = %payment.id,
                    department = %payment.department_id,
                    amount = payment.amount,
                    due,
                    "partial payment does not settle the due"
                );
            }
        }
        if let Some(position) = ordered
            .iter()
            .position(|payment| payment.status == PaymentStatus::UnderReview)
        {
            let later_paid = ordered[..position]
                .iter()
                .any(|payment| payment.status == PaymentStatus::Paid);
            if !later_paid {
                return Standing::UnderReview;
            }
        }
        match ordered.first() {
            Some(payment) if payment.status == PaymentStatus::Rejected => Standing::Rejected,
            _ => Standing::Pending,
        }
    }

    /// Builds the reconciled row for one department.
    pub fn department_standing(
        department_id: &str,
        due: i64,
        payments: &[&Payment],
    ) -> DepartmentStanding {
        let standing = Self::classify(due, payments);
        let (settled_amount, settling_payment) = if standing == Standing::Paid {
            let ordered = Self::most_recent_first(payments);
            Self::settling_payment(due, &ordered)
                .map(|payment| (payment.amount, Some(payment.id)))
                .unwrap_or((0, None))
        } else {
            (0, None)
        };
        DepartmentStanding {
            department_id: department_id.to_owned(),
            due,
            standing,
            settled_amount,
            settling_payment,
        }
    }

    /// Reconciles a whole period: allocates dues over the active
    /// departments, classifies each one, and aggregates portfolio totals.
    ///
    /// Fails `NotFound` when the period has no expense sheet and
    /// `Inconsistent` when a payment references a missing or inactive
    /// department — bad records are surfaced, never skipped.
    pub fn portfolio(condo: &Condominium, period: Period) -> CoreResult<PortfolioSummary> {
        let expense = condo
            .monthly_expense(period)
            .ok_or_else(|| CoreError::NotFound(format!("expense sheet for {period}")))?;
        let active = condo.active_departments();
        for payment in condo.payments_in_period(period) {
            let known = active
                .iter()
                .any(|department| department.id == payment.department_id);
            if !known {
                return Err(CoreError::Inconsistent(format!(
                    "payment {} references missing or inactive department {}",
                    payment.id, payment.department_id
                )));
            }
        }
        let dues = DueService::allocate(&active, &expense.breakdown())?;

        let mut summary = PortfolioSummary {
            period,
            collected: 0,
            outstanding: 0,
            paid_count: 0,
            pending_count: 0,
            under_review_count: 0,
            rejected_count: 0,
            standings: Vec::with_capacity(dues.len()),
        };
        for assignment in dues {
            let payments = condo.payments_for(&assignment.department_id, period);
            let row = Self::department_standing(
                &assignment.department_id,
                assignment.due,
                &payments,
            );
            match row.standing {
                Standing::Paid => {
                    summary.paid_count += 1;
                    summary.collected += row.settled_amount;
                }
                Standing::Pending => {
                    summary.pending_count += 1;
                    summary.outstanding += row.due;
                }
                Standing::UnderReview => {
                    summary.under_review_count += 1;
                    summary.outstanding += row.due;
                }
                Standing::Rejected => {
                    summary.rejected_count += 1;
                    summary.outstanding += row.due;
                }
            }
            summary.standings.push(row);
        }
        Ok(summary)
    }

    /// Total order: `created_at` descending, ties broken by id descending.
    fn most_recent_first<'a>(payments: &[&'a Payment]) -> Vec<&'a Payment> {
        let mut ordered = payments.to_vec();
        ordered.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        ordered
    }

    /// The most recent paid record that covers the due, if any.
    fn settling_payment<'a>(due: i64, ordered: &[&'a Payment]) -> Option<&'a Payment> {
        ordered
            .iter()
            .find(|payment| payment.status == PaymentStatus::Paid && payment.amount >= due)
            .copied()
    }
}
