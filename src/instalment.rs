use crate::calendar::{add_calendar_months, days_between};
use crate::error::InvalidPlanError;
use chrono::NaiveDate;
use log::{debug, trace};
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct InstallmentPlan {
    first_payment_date: NaiveDate,
    monthly_amount: f64,
    term_months: u32,
}

impl InstallmentPlan {
    pub fn new(
        first_payment_date: NaiveDate,
        monthly_amount: f64,
        term_months: i64,
    ) -> Result<Self, InvalidPlanError> {
        if term_months <= 0 {
            return Err(InvalidPlanError::NonPositiveTerm(term_months));
        }
        let term_months = u32::try_from(term_months)
            .map_err(|_| InvalidPlanError::DateOutOfRange(first_payment_date))?;
        if !monthly_amount.is_finite() || monthly_amount <= 0. {
            return Err(InvalidPlanError::InvalidAmount(monthly_amount));
        }
        // the final step must exist, which covers every step before it
        if add_calendar_months(first_payment_date, term_months).is_none() {
            return Err(InvalidPlanError::DateOutOfRange(first_payment_date));
        }

        Ok(Self {
            first_payment_date,
            monthly_amount,
            term_months,
        })
    }

    pub fn first_payment_date(&self) -> NaiveDate {
        self.first_payment_date
    }

    pub fn monthly_amount(&self) -> f64 {
        self.monthly_amount
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    // schedule is range-checked in new()
    fn due_date(&self, n: u32) -> NaiveDate {
        add_calendar_months(self.first_payment_date, n).unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PaymentProjection {
    pub paid_count: u32,
    pub paid_amount: f64,
    pub total_amount: f64,
    pub remaining_amount: f64,
    pub remaining_count: u32,
    pub progress_fraction: f64,
    pub next_due_date: NaiveDate,
    pub days_until_next_due: i64,
    pub is_overdue: bool,
}

impl PaymentProjection {
    pub fn progress_percentage(&self) -> f64 {
        self.progress_fraction * 100.
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_count == 0
    }
}

impl fmt::Display for PaymentProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "paid {} of {} (${:.2} of ${:.2}), remaining ${:.2}, next due {} in {} days{}",
            self.paid_count,
            self.paid_count + self.remaining_count,
            self.paid_amount,
            self.total_amount,
            self.remaining_amount,
            self.next_due_date,
            self.days_until_next_due,
            if self.is_overdue { ", overdue" } else { "" }
        )
    }
}

/// Counts an installment as paid once its due date is on or before `as_of`.
/// Recorded payments are not consulted, see
/// [`crate::bank_loan::compute_by_recorded_payments`] for that policy.
pub fn project(plan: &InstallmentPlan, as_of: NaiveDate) -> PaymentProjection {
    let mut paid_count = 0;
    let mut cursor = plan.first_payment_date;

    while cursor <= as_of && paid_count < plan.term_months {
        paid_count += 1;
        cursor = plan.due_date(paid_count);
        trace!("installment {} counted, cursor now {}", paid_count, cursor);
    }

    let paid_amount = f64::from(paid_count) * plan.monthly_amount;
    let total_amount = f64::from(plan.term_months) * plan.monthly_amount;
    let remaining_count = plan.term_months - paid_count;
    let progress_fraction = if plan.term_months == 0 {
        0.
    } else {
        f64::from(paid_count) / f64::from(plan.term_months)
    };

    let next_due_date = plan.due_date(paid_count);
    let raw_days = days_between(as_of, next_due_date);

    let projection = PaymentProjection {
        paid_count,
        paid_amount,
        total_amount,
        remaining_amount: total_amount - paid_amount,
        remaining_count,
        progress_fraction,
        next_due_date,
        days_until_next_due: raw_days.max(0),
        is_overdue: raw_days < 0 && remaining_count > 0,
    };
    debug!("projection as of {}: {}", as_of, projection);
    projection
}

pub fn project_by_elapsed_time(plan: &InstallmentPlan, as_of: NaiveDate) -> PaymentProjection {
    project(plan, as_of)
}

pub fn project_now(plan: &InstallmentPlan) -> PaymentProjection {
    project(plan, chrono::Local::now().date_naive())
}
