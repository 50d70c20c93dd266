//! The condominium snapshot aggregate and its lookup helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::Period,
    department::Department,
    expense::{ExtraordinaryExpense, MonthlyExpense},
    payment::Payment,
    user::User,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory snapshot of one condominium: every entity the services operate
/// on, as fetched from the persistence boundary in one consistent read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condominium {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub monthly_expenses: Vec<MonthlyExpense>,
    #[serde(default)]
    pub extraordinary_expenses: Vec<ExtraordinaryExpense>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub users: Vec<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Condominium::schema_version_default")]
    pub schema_version: u8,
}

impl Condominium {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            departments: Vec::new(),
            monthly_expenses: Vec::new(),
            extraordinary_expenses: Vec::new(),
            payments: Vec::new(),
            users: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_department(&mut self, department: Department) -> String {
        let id = department.id.clone();
        self.departments.push(department);
        self.touch();
        id
    }

    pub fn add_monthly_expense(&mut self, expense: MonthlyExpense) -> Period {
        let period = expense.period;
        self.monthly_expenses.push(expense);
        self.touch();
        period
    }

    pub fn add_extraordinary_expense(&mut self, expense: ExtraordinaryExpense) -> Uuid {
        let id = expense.id;
        self.extraordinary_expenses.push(expense);
        self.touch();
        id
    }

    pub fn add_payment(&mut self, payment: Payment) -> Uuid {
        let id = payment.id;
        self.payments.push(payment);
        self.touch();
        id
    }

    pub fn add_user(&mut self, user: User) -> String {
        let id = user.id.clone();
        self.users.push(user);
        self.touch();
        id
    }

    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|dept| dept.id == id)
    }

    pub fn department_mut(&mut self, id: &str) -> Option<&mut Department> {
        self.departments.iter_mut().find(|dept| dept.id == id)
    }

    pub fn active_departments(&self) -> Vec<&Department> {
        self.departments.iter().filter(|dept| dept.active).collect()
    }

    /// Sum of floor areas over active departments.
    pub fn total_active_area(&self) -> f64 {
        self.departments
            .iter()
            .filter(|dept| dept.active)
            .map(|dept| dept.area_m2)
            .sum()
    }

    pub fn monthly_expense(&self, period: Period) -> Option<&MonthlyExpense> {
        self.monthly_expenses
            .iter()
            .find(|expense| expense.period == period)
    }

    pub fn monthly_expense_mut(&mut self, period: Period) -> Option<&mut MonthlyExpense> {
        self.monthly_expenses
            .iter_mut()
            .find(|expense| expense.period == period)
    }

    pub fn extraordinary_expense(&self, id: Uuid) -> Option<&ExtraordinaryExpense> {
        self.extraordinary_expenses
            .iter()
            .find(|expense| expense.id == id)
    }

    pub fn extraordinary_expense_mut(&mut self, id: Uuid) -> Option<&mut ExtraordinaryExpense> {
        self.extraordinary_expenses
            .iter_mut()
            .find(|expense| expense.id == id)
    }

    pub fn payment(&self, id: Uuid) -> Option<&Payment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    pub fn payment_mut(&mut self, id: Uuid) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|payment| payment.id == id)
    }

    /// Every payment attempt of a department for a period, in insertion order.
    pub fn payments_for(&self, department_id: &str, period: Period) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|payment| payment.department_id == department_id && payment.period == period)
            .collect()
    }

    pub fn payments_in_period(&self, period: Period) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|payment| payment.period == period)
            .collect()
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
