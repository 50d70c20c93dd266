//! Allocation of expected dues across departments.

use condo_domain::{Department, ExpenseBreakdown, ExtraordinaryExpense};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// A department's expected due for one period, in the smallest currency unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DueAssignment {
    pub department_id: String,
    pub due: i64,
}

/// Stateless due computations. Rounding happens exactly once here; every
/// consumer reads the allocated value instead of re-deriving it.
pub struct DueService;

impl DueService {
    /// Expected monthly due of a single department:
    /// `round_half_up(area_m2 * rate_per_m2)`.
    ///
    /// Inactive departments and non-positive areas fail with `InvalidInput`
    /// rather than silently yielding a zero due.
    pub fn monthly_due(department: &Department, rate_per_m2: f64) -> CoreResult<i64> {
        Self::ensure_billable(department)?;
        if rate_per_m2 < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "rate per m2 must not be negative, got {rate_per_m2}"
            )));
        }
        Ok(round_half_up(department.area_m2 * rate_per_m2))
    }

    /// Allocates dues for every supplied department and reconciles the
    /// rounding residual so the dues sum exactly to `breakdown.total`.
    ///
    /// The residual (bounded by half a unit per department) is assigned
    /// wholly to the carrier: the department with the largest area, ties
    /// broken by smallest id. Output is sorted by department id.
    pub fn allocate(
        departments: &[&Department],
        breakdown: &ExpenseBreakdown,
    ) -> CoreResult<Vec<DueAssignment>> {
        if departments.is_empty() {
            return Err(CoreError::InvalidInput(
                "no departments to allocate against".into(),
            ));
        }
        let mut assignments = Vec::with_capacity(departments.len());
        for department in departments {
            assignments.push(DueAssignment {
                department_id: department.id.clone(),
                due: Self::monthly_due(department, breakdown.rate_per_m2)?,
            });
        }
        assignments.sort_by(|a, b| a.department_id.cmp(&b.department_id));

        let allocated: i64 = assignments.iter().map(|entry| entry.due).sum();
        let residual = breakdown.total - allocated;
        if residual != 0 {
            let carrier_id = Self::residual_carrier(departments);
            if let Some(entry) = assignments
                .iter_mut()
                .find(|entry| entry.department_id == carrier_id)
            {
                entry.due += residual;
            }
        }
        Ok(assignments)
    }

    /// Expected due for an extraordinary expense: the flat per-department
    /// amount, independent of area. Same billable guards as the monthly path.
    pub fn extraordinary_due(
        department: &Department,
        expense: &ExtraordinaryExpense,
    ) -> CoreResult<i64> {
        Self::ensure_billable(department)?;
        Ok(expense.amount_per_department)
    }

    fn ensure_billable(department: &Department) -> CoreResult<()> {
        if !department.active {
            return Err(CoreError::InvalidInput(format!(
                "department {} is inactive",
                department.id
            )));
        }
        if department.area_m2 <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "department {} has non-positive area",
                department.id
            )));
        }
        Ok(())
    }

    fn residual_carrier(departments: &[&Department]) -> String {
        let mut carrier = departments[0];
        for &department in &departments[1..] {
            let larger = department.area_m2 > carrier.area_m2;
            let tie_smaller_id = department.area_m2 == carrier.area_m2
                && department.id < carrier.id;
            if larger || tie_smaller_id {
                carrier = department;
            }
        }
        carrier.id.clone()
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use condo_domain::Department;

    fn dept(id: &str, area: f64) -> Department {
        Department::new(id, "Owner", area)
    }

    #[test]
    fn monthly_due_rounds_half_up_once() {
        let department = dept("DEPTO-101", 50.0);
        assert_eq!(
            DueService::monthly_due(&department, 160.0).expect("valid due"),
            8000
        );
        // 33.5 * 100.01 = 3350.335 -> 3350
        assert_eq!(
            DueService::monthly_due(&dept("DEPTO-102", 33.5), 100.01).unwrap(),
            3350
        );
        // half units round up
        assert_eq!(
            DueService::monthly_due(&dept("DEPTO-103", 1.0), 10.5).unwrap(),
            11
        );
    }

    #[test]
    fn inactive_department_is_rejected() {
        let mut department = dept("DEPTO-101", 50.0);
        department.active = false;
        let err = DueService::monthly_due(&department, 160.0).expect_err("must fail");
        assert!(matches!(err, CoreError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn non_positive_area_is_rejected() {
        let department = dept("DEPTO-101", 0.0);
        assert!(DueService::monthly_due(&department, 160.0).is_err());
    }

    #[test]
    fn allocation_reconciles_to_the_expense_total() {
        let a = dept("DEPTO-101", 1.0);
        let b = dept("DEPTO-102", 1.0);
        let c = dept("DEPTO-103", 1.0);
        let breakdown = ExpenseBreakdown {
            total: 100,
            rate_per_m2: 100.0 / 3.0,
        };
        let dues =
            DueService::allocate(&[&a, &b, &c], &breakdown).expect("allocation succeeds");
        let sum: i64 = dues.iter().map(|entry| entry.due).sum();
        assert_eq!(sum, 100);
        // equal areas: the smallest id carries the residual
        assert_eq!(dues[0].department_id, "DEPTO-101");
        assert_eq!(dues[0].due, 34);
        assert_eq!(dues[1].due, 33);
        assert_eq!(dues[2].due, 33);
    }

    #[test]
    fn residual_carrier_prefers_largest_area() {
        let small = dept("DEPTO-101", 10.0);
        let large = dept("DEPTO-202", 40.0);
        let breakdown = ExpenseBreakdown {
            total: 1001,
            rate_per_m2: 1001.0 / 50.0,
        };
        let dues = DueService::allocate(&[&small, &large], &breakdown).unwrap();
        let sum: i64 = dues.iter().map(|entry| entry.due).sum();
        assert_eq!(sum, 1001);
        let large_due = dues
            .iter()
            .find(|entry| entry.department_id == "DEPTO-202")
            .unwrap()
            .due;
        // 40 * 20.02 = 800.8 -> 801, plus the residual adjustment if any
        assert!(large_due >= 801, "carrier holds the residual: {large_due}");
    }

    #[test]
    fn allocation_is_idempotent() {
        let a = dept("DEPTO-101", 37.5);
        let b = dept("DEPTO-102", 62.5);
        let breakdown = ExpenseBreakdown {
            total: 123457,
            rate_per_m2: 123457.0 / 100.0,
        };
        let first = DueService::allocate(&[&a, &b], &breakdown).unwrap();
        let second = DueService::allocate(&[&b, &a], &breakdown).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn extraordinary_due_is_flat() {
        let department = dept("DEPTO-101", 50.0);
        let expense = ExtraordinaryExpense::new("Roof repair", 500000, 25000, chrono::Utc::now());
        assert_eq!(
            DueService::extraordinary_due(&department, &expense).unwrap(),
            25000
        );
        let bigger = dept("DEPTO-102", 120.0);
        assert_eq!(
            DueService::extraordinary_due(&bigger, &expense).unwrap(),
            25000
        );
    }
}
