//! condo-core
//!
//! Business logic for condominium common-expense management: expense
//! aggregation, due allocation, payment reconciliation, and the access
//! policy, plus the administrator-facing write paths. Depends on
//! condo-domain. No HTTP, no terminal I/O, no direct storage interactions.

pub mod access_policy;
pub mod department_service;
pub mod due_service;
pub mod error;
pub mod expense_service;
pub mod format;
pub mod payment_service;
pub mod reconcile_service;
pub mod storage;
pub mod time;
pub mod user_service;

pub use access_policy::{AccessPolicy, ResourceRef, WriteAction};
pub use department_service::{
    DepartmentService, DepartmentUpdate, MAX_RESIDENTS_PER_DEPARTMENT,
};
pub use due_service::{DueAssignment, DueService};
pub use error::{CoreError, CoreResult};
pub use expense_service::ExpenseService;
pub use payment_service::{GatewayOutcome, PaymentService};
pub use reconcile_service::{
    DepartmentStanding, PortfolioSummary, ReconcileService, Standing,
};
pub use storage::{condominium_warnings, CondoBackupInfo, CondominiumStorage};
pub use time::{Clock, FixedClock, SystemClock};
pub use user_service::{UserService, UserUpdate};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("condo_core=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("condo-core tracing initialized.");
    });
}
