//! Monthly and extraordinary expense registration.

use condo_domain::{
    Actor, Condominium, ExpenseBreakdown, ExpenseItem, ExtraordinaryExpense,
    ExtraordinaryPaymentMark, MonthlyExpense, Payment, Period,
};
use uuid::Uuid;

use crate::{
    access_policy::{AccessPolicy, ResourceRef, WriteAction},
    due_service::DueService,
    time::Clock,
    CoreError, CoreResult,
};

/// Validated mutations and pure computations for expense sheets.
pub struct ExpenseService;

impl ExpenseService {
    /// Computes the derived totals of an item list against the building's
    /// billable area. Pure: identical inputs always produce identical
    /// outputs, and the rate keeps full precision.
    pub fn aggregate(items: &[ExpenseItem], total_area_m2: f64) -> CoreResult<ExpenseBreakdown> {
        if items.is_empty() {
            return Err(CoreError::InvalidInput(
                "a monthly expense needs at least one item".into(),
            ));
        }
        if let Some(item) = items.iter().find(|item| item.amount < 0) {
            return Err(CoreError::InvalidInput(format!(
                "item `{}` has a negative amount",
                item.concept
            )));
        }
        if total_area_m2 <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "total area must be positive, got {total_area_m2}"
            )));
        }
        let total: i64 = items.iter().map(|item| item.amount).sum();
        Ok(ExpenseBreakdown {
            total,
            rate_per_m2: total as f64 / total_area_m2,
        })
    }

    /// Registers the expense sheet of a new period and seeds the expected
    /// dues: every active department without a payment record for the
    /// period gets a pending one carrying its allocated due, and the
    /// department's cached `monthly_due` is refreshed.
    pub fn create_monthly(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        period: Period,
        items: Vec<ExpenseItem>,
    ) -> CoreResult<Period> {
        AccessPolicy::authorize_write(actor, &ResourceRef::MonthlyExpense, WriteAction::Create)?;
        if condo.monthly_expense(period).is_some() {
            return Err(CoreError::InvalidInput(format!(
                "an expense sheet for {period} already exists"
            )));
        }
        let breakdown = Self::aggregate(&items, condo.total_active_area())?;
        let dues = DueService::allocate(&condo.active_departments(), &breakdown)?;

        condo.add_monthly_expense(MonthlyExpense::new(period, items, breakdown));
        let now = clock.now();
        for assignment in dues {
            let missing = condo
                .payments_for(&assignment.department_id, period)
                .is_empty();
            if missing {
                let mut payment =
                    Payment::new(assignment.department_id.clone(), period, assignment.due, now);
                payment.notes = Some("seeded from expense sheet".into());
                condo.add_payment(payment);
            }
            if let Some(department) = condo.department_mut(&assignment.department_id) {
                department.monthly_due = assignment.due;
                department.updated_at = now;
            }
        }
        condo.touch();
        Ok(period)
    }

    /// Replaces the item list of an existing period and recomputes the
    /// derived totals from scratch; they are never patched independently of
    /// their source items.
    pub fn update_monthly(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        period: Period,
        items: Vec<ExpenseItem>,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(actor, &ResourceRef::MonthlyExpense, WriteAction::Update)?;
        let breakdown = Self::aggregate(&items, condo.total_active_area())?;
        let expense = condo
            .monthly_expense_mut(period)
            .ok_or_else(|| CoreError::NotFound(format!("expense sheet for {period}")))?;
        expense.items = items;
        expense.total = breakdown.total;
        expense.rate_per_m2 = breakdown.rate_per_m2;
        expense.updated_at = clock.now();
        condo.touch();
        Ok(())
    }

    /// The most recent expense sheets, newest first.
    pub fn latest_monthly(condo: &Condominium, count: usize) -> Vec<&MonthlyExpense> {
        let mut sheets: Vec<&MonthlyExpense> = condo.monthly_expenses.iter().collect();
        sheets.sort_by(|a, b| b.period.cmp(&a.period));
        sheets.truncate(count);
        sheets
    }

    /// Registers a flat per-department charge and opens an unpaid mark for
    /// every active department.
    pub fn create_extraordinary(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        concept: impl Into<String>,
        total_amount: i64,
        amount_per_department: i64,
    ) -> CoreResult<Uuid> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::ExtraordinaryExpense,
            WriteAction::Create,
        )?;
        if total_amount <= 0 || amount_per_department <= 0 {
            return Err(CoreError::InvalidInput(
                "extraordinary amounts must be positive".into(),
            ));
        }
        let mut expense = ExtraordinaryExpense::new(
            concept,
            total_amount,
            amount_per_department,
            clock.now(),
        );
        for department in condo.active_departments() {
            expense
                .payments
                .insert(department.id.clone(), ExtraordinaryPaymentMark::default());
        }
        Ok(condo.add_extraordinary_expense(expense))
    }

    /// Marks a department's share of an extraordinary expense as settled.
    pub fn mark_extraordinary_paid(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        expense_id: Uuid,
        department_id: &str,
    ) -> CoreResult<()> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::ExtraordinaryExpense,
            WriteAction::Update,
        )?;
        if condo.department(department_id).is_none() {
            return Err(CoreError::Inconsistent(format!(
                "department {department_id} is not part of this condominium"
            )));
        }
        let now = clock.now();
        let expense = condo
            .extraordinary_expense_mut(expense_id)
            .ok_or_else(|| CoreError::NotFound(format!("extraordinary expense {expense_id}")))?;
        let mark = expense
            .payments
            .entry(department_id.to_owned())
            .or_default();
        mark.paid = true;
        mark.paid_at = Some(now);
        condo.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use condo_domain::{Department, PaymentStatus};

    fn admin() -> Actor {
        Actor::new("admin-1", None, true)
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap())
    }

    fn condo_with_departments() -> Condominium {
        let mut condo = Condominium::new("Edificio Mirador");
        condo.add_department(Department::new("DEPTO-101", "Ana", 50.0));
        condo.add_department(Department::new("DEPTO-102", "Luis", 450.0));
        condo
    }

    fn period(raw: &str) -> Period {
        raw.parse().expect("valid period")
    }

    #[test]
    fn aggregate_sums_items_and_derives_rate() {
        let items = vec![
            ExpenseItem::new("Agua", 50000),
            ExpenseItem::new("Aseo", 30000),
        ];
        let breakdown = ExpenseService::aggregate(&items, 500.0).expect("valid sheet");
        assert_eq!(breakdown.total, 80000);
        assert_eq!(breakdown.rate_per_m2, 160.0);
    }

    #[test]
    fn aggregate_rejects_bad_input() {
        let items = vec![ExpenseItem::new("Agua", -1)];
        assert!(ExpenseService::aggregate(&items, 500.0).is_err());
        let items = vec![ExpenseItem::new("Agua", 1000)];
        assert!(ExpenseService::aggregate(&items, 0.0).is_err());
        assert!(ExpenseService::aggregate(&[], 500.0).is_err());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let items = vec![ExpenseItem::new("Luz", 12345), ExpenseItem::new("Gas", 678)];
        let first = ExpenseService::aggregate(&items, 123.4).unwrap();
        let second = ExpenseService::aggregate(&items, 123.4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn create_monthly_seeds_pending_dues() {
        let mut condo = condo_with_departments();
        let items = vec![
            ExpenseItem::new("Agua", 50000),
            ExpenseItem::new("Aseo", 30000),
        ];
        ExpenseService::create_monthly(&mut condo, &admin(), &clock(), period("2025-01"), items)
            .expect("sheet created");

        let sheet = condo.monthly_expense(period("2025-01")).expect("stored");
        assert_eq!(sheet.total, 80000);
        assert_eq!(sheet.rate_per_m2, 160.0);

        let seeded = condo.payments_for("DEPTO-101", period("2025-01"));
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].amount, 8000);
        assert_eq!(seeded[0].status, PaymentStatus::Pending);
        assert!(seeded[0].method.is_none());
        assert_eq!(
            condo.department("DEPTO-101").unwrap().monthly_due,
            8000
        );
    }

    #[test]
    fn create_monthly_rejects_duplicate_period() {
        let mut condo = condo_with_departments();
        let items = vec![ExpenseItem::new("Agua", 1000)];
        ExpenseService::create_monthly(
            &mut condo,
            &admin(),
            &clock(),
            period("2025-01"),
            items.clone(),
        )
        .expect("first sheet");
        let err = ExpenseService::create_monthly(
            &mut condo,
            &admin(),
            &clock(),
            period("2025-01"),
            items,
        )
        .expect_err("duplicate must fail");
        assert!(matches!(err, CoreError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn create_monthly_requires_admin() {
        let mut condo = condo_with_departments();
        let resident = Actor::new("uid-1", Some("DEPTO-101".into()), false);
        let err = ExpenseService::create_monthly(
            &mut condo,
            &resident,
            &clock(),
            period("2025-01"),
            vec![ExpenseItem::new("Agua", 1000)],
        )
        .expect_err("resident cannot register sheets");
        assert!(matches!(err, CoreError::Forbidden), "got {err:?}");
    }

    #[test]
    fn update_monthly_recomputes_from_items() {
        let mut condo = condo_with_departments();
        ExpenseService::create_monthly(
            &mut condo,
            &admin(),
            &clock(),
            period("2025-01"),
            vec![ExpenseItem::new("Agua", 1000)],
        )
        .unwrap();
        ExpenseService::update_monthly(
            &mut condo,
            &admin(),
            &clock(),
            period("2025-01"),
            vec![ExpenseItem::new("Agua", 2000), ExpenseItem::new("Luz", 500)],
        )
        .unwrap();
        let sheet = condo.monthly_expense(period("2025-01")).unwrap();
        assert_eq!(sheet.total, 2500);
        assert_eq!(sheet.rate_per_m2, 5.0);
    }

    #[test]
    fn extraordinary_marks_track_settlement() {
        let mut condo = condo_with_departments();
        let id = ExpenseService::create_extraordinary(
            &mut condo,
            &admin(),
            &clock(),
            "Roof repair",
            500000,
            250000,
        )
        .expect("charge created");

        let expense = condo.extraordinary_expense(id).unwrap();
        assert_eq!(expense.payments.len(), 2);
        assert!(!expense.is_paid_by("DEPTO-101"));

        ExpenseService::mark_extraordinary_paid(&mut condo, &admin(), &clock(), id, "DEPTO-101")
            .expect("mark succeeds");
        let expense = condo.extraordinary_expense(id).unwrap();
        assert!(expense.is_paid_by("DEPTO-101"));
        assert!(!expense.is_paid_by("DEPTO-102"));
    }

    #[test]
    fn extraordinary_mark_for_unknown_department_is_inconsistent() {
        let mut condo = condo_with_departments();
        let id = ExpenseService::create_extraordinary(
            &mut condo,
            &admin(),
            &clock(),
            "Roof repair",
            500000,
            250000,
        )
        .unwrap();
        let err = ExpenseService::mark_extraordinary_paid(
            &mut condo,
            &admin(),
            &clock(),
            id,
            "DEPTO-999",
        )
        .expect_err("unknown department");
        assert!(matches!(err, CoreError::Inconsistent(_)), "got {err:?}");
    }

    #[test]
    fn latest_monthly_returns_newest_first() {
        let mut condo = condo_with_departments();
        for raw in ["2024-11", "2025-01", "2024-12"] {
            ExpenseService::create_monthly(
                &mut condo,
                &admin(),
                &clock(),
                period(raw),
                vec![ExpenseItem::new("Agua", 1000)],
            )
            .unwrap();
        }
        let sheets = ExpenseService::latest_monthly(&condo, 2);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].period, period("2025-01"));
        assert_eq!(sheets[1].period, period("2024-12"));
    }
}
