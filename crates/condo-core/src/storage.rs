//! Persistence abstraction and snapshot anomaly detection.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use condo_domain::Condominium;

use crate::CoreError;

/// Describes a persisted backup artifact for a condominium snapshot.
#[derive(Debug, Clone)]
pub struct CondoBackupInfo {
    pub condominium: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing condominium
/// snapshots and backups.
pub trait CondominiumStorage: Send + Sync {
    fn save_condominium(&self, name: &str, condo: &Condominium) -> Result<(), CoreError>;
    fn load_condominium(&self, name: &str) -> Result<Condominium, CoreError>;
    fn list_condominiums(&self) -> Result<Vec<String>, CoreError>;
    fn delete_condominium(&self, name: &str) -> Result<(), CoreError>;
    fn save_to_path(&self, condo: &Condominium, path: &Path) -> Result<(), CoreError>;
    fn load_from_path(&self, path: &Path) -> Result<Condominium, CoreError>;
    fn backup_condominium(
        &self,
        name: &str,
        condo: &Condominium,
        note: Option<&str>,
    ) -> Result<CondoBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<CondoBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &CondoBackupInfo) -> Result<Condominium, CoreError>;
}

/// Detects dangling references and derived-total drift within a snapshot.
pub fn condominium_warnings(condo: &Condominium) -> Vec<String> {
    let department_ids: HashSet<_> = condo
        .departments
        .iter()
        .map(|department| department.id.as_str())
        .collect();
    let mut warnings = Vec::new();

    for payment in &condo.payments {
        if !department_ids.contains(payment.department_id.as_str()) {
            warnings.push(format!(
                "payment {} references unknown department {}",
                payment.id, payment.department_id
            ));
        }
    }
    for user in &condo.users {
        if let Some(department_id) = user.department_id.as_deref() {
            if !department_ids.contains(department_id) {
                warnings.push(format!(
                    "user {} references unknown department {}",
                    user.id, department_id
                ));
            }
        }
    }
    for expense in &condo.extraordinary_expenses {
        for department_id in expense.payments.keys() {
            if !department_ids.contains(department_id.as_str()) {
                warnings.push(format!(
                    "extraordinary expense {} holds a mark for unknown department {}",
                    expense.id, department_id
                ));
            }
        }
    }
    for expense in &condo.monthly_expenses {
        let computed: i64 = expense.items.iter().map(|item| item.amount).sum();
        if computed != expense.total {
            warnings.push(format!(
                "expense sheet {} stores total {} but its items sum to {}",
                expense.period, expense.total, computed
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use condo_domain::{Department, ExpenseItem, Payment, Period};

    #[test]
    fn clean_snapshot_has_no_warnings() {
        let mut condo = Condominium::new("Edificio Mirador");
        condo.add_department(Department::new("DEPTO-101", "Ana", 50.0));
        assert!(condominium_warnings(&condo).is_empty());
    }

    #[test]
    fn dangling_payment_reference_is_reported() {
        let mut condo = Condominium::new("Edificio Mirador");
        let period: Period = "2025-01".parse().unwrap();
        condo.add_payment(Payment::new("DEPTO-404", period, 8000, Utc::now()));
        let warnings = condominium_warnings(&condo);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("DEPTO-404"));
    }

    #[test]
    fn total_drift_is_reported() {
        let mut condo = Condominium::new("Edificio Mirador");
        condo.add_department(Department::new("DEPTO-101", "Ana", 50.0));
        let period: Period = "2025-01".parse().unwrap();
        let mut sheet = condo_domain::MonthlyExpense::new(
            period,
            vec![ExpenseItem::new("Agua", 1000)],
            condo_domain::ExpenseBreakdown {
                total: 1000,
                rate_per_m2: 20.0,
            },
        );
        sheet.total = 999; // simulate a hand-patched record
        condo.add_monthly_expense(sheet);
        let warnings = condominium_warnings(&condo);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("999"));
    }
}
