use thiserror::Error;

/// Render a placeholder for rows failing with this, never a zero that reads
/// like a fully paid plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidPlanError {
    #[error("term must be a positive number of months, got {0}")]
    NonPositiveTerm(i64),

    #[error("monthly amount must be a positive finite number, got {0}")]
    InvalidAmount(f64),

    #[error("unparseable first installment date: {0:?}")]
    UnparseableDate(String),

    #[error("payment schedule starting {0} leaves the supported date range")]
    DateOutOfRange(chrono::NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidLoanError {
    #[error("{field} must be a non-negative finite number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("unknown bank: {0:?}")]
    UnknownBank(String),

    #[error("unknown loan status: {0:?}")]
    UnknownStatus(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidFilterError {
    #[error("unknown payment status filter: {0:?}")]
    UnknownPaymentStatus(String),
}
