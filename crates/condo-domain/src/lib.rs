//! condo-domain
//!
//! Pure domain models for condominium common-expense management
//! (Department, MonthlyExpense, Payment, User, etc.).
//! No I/O, no services, no storage. Only data types and core enums.

pub mod common;
pub mod condominium;
pub mod department;
pub mod expense;
pub mod payment;
pub mod user;

pub use common::*;
pub use condominium::*;
pub use department::*;
pub use expense::*;
pub use payment::*;
pub use user::*;
