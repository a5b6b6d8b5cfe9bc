pub mod bank_loan;
pub mod cache;
pub mod calendar;
pub mod deduction;
pub mod error;
pub mod instalment;
pub mod vehicle;

pub use error::{InvalidFilterError, InvalidLoanError, InvalidPlanError};
pub use instalment::{project, project_by_elapsed_time, InstallmentPlan, PaymentProjection};
