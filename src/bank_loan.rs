use crate::calendar::days_between;
use crate::error::InvalidLoanError;
use chrono::NaiveDate;
use log::{debug, trace, warn};
use std::{cmp::Ordering, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bank {
    #[cfg_attr(feature = "serde", serde(rename = "Ahli Bank"))]
    AhliBank,
    #[cfg_attr(feature = "serde", serde(rename = "Khaleej Bank"))]
    KhaleejBank,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::AhliBank => write!(f, "Ahli Bank"),
            Bank::KhaleejBank => write!(f, "Khaleej Bank"),
        }
    }
}

impl FromStr for Bank {
    type Err = InvalidLoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Ahli Bank" => Ok(Bank::AhliBank),
            "Khaleej Bank" => Ok(Bank::KhaleejBank),
            other => Err(InvalidLoanError::UnknownBank(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoanStatus {
    Active,
    Closed,
    Overdue,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Closed => write!(f, "closed"),
            LoanStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl FromStr for LoanStatus {
    type Err = InvalidLoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "closed" => Ok(LoanStatus::Closed),
            "overdue" => Ok(LoanStatus::Overdue),
            _ => Err(InvalidLoanError::UnknownStatus(s.to_string())),
        }
    }
}

// stored status is informational, compute_by_recorded_payments derives its own
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", try_from = "BankLoanRecord")
)]
pub struct BankLoan {
    pub id: String,
    pub person_in_charge: String,
    pub initiation_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub original_amount: f64,
    pub repayment_amount: f64,
    pub bank: Bank,
    pub status: LoanStatus,
}

impl BankLoan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        person_in_charge: impl Into<String>,
        initiation_date: NaiveDate,
        maturity_date: NaiveDate,
        original_amount: f64,
        repayment_amount: f64,
        bank: Bank,
        status: LoanStatus,
    ) -> Result<Self, InvalidLoanError> {
        check_amount("originalAmount", original_amount)?;
        check_amount("repaymentAmount", repayment_amount)?;
        Ok(Self {
            id: id.into(),
            person_in_charge: person_in_charge.into(),
            initiation_date,
            maturity_date,
            original_amount,
            repayment_amount,
            bank,
            status,
        })
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), InvalidLoanError> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(InvalidLoanError::InvalidAmount { field, value })
    }
}

// wire shape of a loan document, validated on the way into `BankLoan`
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankLoanRecord {
    id: String,
    person_in_charge: String,
    initiation_date: NaiveDate,
    maturity_date: NaiveDate,
    original_amount: f64,
    repayment_amount: f64,
    bank: Bank,
    status: LoanStatus,
}

#[cfg(feature = "serde")]
impl TryFrom<BankLoanRecord> for BankLoan {
    type Error = InvalidLoanError;

    fn try_from(r: BankLoanRecord) -> Result<Self, Self::Error> {
        BankLoan::new(
            r.id,
            r.person_in_charge,
            r.initiation_date,
            r.maturity_date,
            r.original_amount,
            r.repayment_amount,
            r.bank,
            r.status,
        )
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", try_from = "PaymentRecord")
)]
pub struct Payment {
    pub id: String,
    pub loan_id: String,
    pub amount: f64,
    pub principal_amount: f64,
    pub interest_amount: f64,
    pub payment_date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl Payment {
    pub fn new(
        id: impl Into<String>,
        loan_id: impl Into<String>,
        amount: f64,
        principal_amount: f64,
        interest_amount: f64,
        payment_date: NaiveDate,
        description: Option<String>,
    ) -> Result<Self, InvalidLoanError> {
        check_amount("amount", amount)?;
        check_amount("principalAmount", principal_amount)?;
        check_amount("interestAmount", interest_amount)?;
        Ok(Self {
            id: id.into(),
            loan_id: loan_id.into(),
            amount,
            principal_amount,
            interest_amount,
            payment_date,
            description,
        })
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRecord {
    id: String,
    loan_id: String,
    amount: f64,
    principal_amount: f64,
    interest_amount: f64,
    payment_date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(feature = "serde")]
impl TryFrom<PaymentRecord> for Payment {
    type Error = InvalidLoanError;

    fn try_from(r: PaymentRecord) -> Result<Self, Self::Error> {
        Payment::new(
            r.id,
            r.loan_id,
            r.amount,
            r.principal_amount,
            r.interest_amount,
            r.payment_date,
            r.description,
        )
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LoanWithCalculations {
    pub loan: BankLoan,
    pub status: LoanStatus,
    pub total_paid: f64,
    pub remaining_amount: f64,
    pub remaining_days: i64,
    pub is_overdue: bool,
}

/// Balance and status of `loan` from the payments actually recorded against
/// it. Payments for other loans are skipped.
pub fn compute_by_recorded_payments(
    loan: &BankLoan,
    payments: &[Payment],
    as_of: NaiveDate,
) -> LoanWithCalculations {
    let mut malformed = false;
    let total_paid: f64 = payments
        .iter()
        .filter(|p| p.loan_id == loan.id)
        .inspect(|p| {
            trace!("loan {} payment {} of {}", loan.id, p.id, p.amount);
            malformed |= check_amount("amount", p.amount).is_err();
        })
        .map(|p| p.amount)
        .sum();

    // a payment that bypassed Payment::new must not read as a paid-off loan
    let outstanding = if malformed {
        warn!("loan {} has a malformed payment amount", loan.id);
        f64::NAN
    } else {
        (loan.repayment_amount - total_paid).max(0.)
    };
    let remaining_days = days_between(as_of, loan.maturity_date);

    let status = if outstanding == 0. {
        LoanStatus::Closed
    } else if remaining_days < 0 {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    };
    if status != loan.status {
        debug!(
            "loan {} stored as {} but evaluates to {}",
            loan.id, loan.status, status
        );
    }

    LoanWithCalculations {
        loan: loan.clone(),
        status,
        total_paid,
        remaining_amount: if status == LoanStatus::Closed {
            0.
        } else {
            outstanding
        },
        remaining_days,
        is_overdue: status == LoanStatus::Overdue,
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LoanPortfolioSummary {
    pub total_loans: usize,
    pub active_loans: usize,
    // both open_* figures skip closed loans
    pub open_original_amount: f64,
    pub open_remaining_amount: f64,
}

pub fn summarize_loans(loans: &[LoanWithCalculations]) -> LoanPortfolioSummary {
    loans.iter().fold(
        LoanPortfolioSummary {
            total_loans: loans.len(),
            ..Default::default()
        },
        |mut s, l| {
            if l.status == LoanStatus::Active {
                s.active_loans += 1;
            }
            if l.status != LoanStatus::Closed {
                s.open_original_amount += l.loan.original_amount;
                s.open_remaining_amount += l.remaining_amount;
            }
            s
        },
    )
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct LoanFilter {
    pub search: String,
    pub bank: Option<Bank>,
    pub status: Option<LoanStatus>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &LoanWithCalculations) -> bool {
        let search = self.search.to_lowercase();
        (search.is_empty() || loan.loan.bank.to_string().to_lowercase().contains(&search))
            && self.bank.map_or(true, |b| loan.loan.bank == b)
            && self.status.map_or(true, |s| loan.status == s)
    }
}

/// Open loans first, each group by maturity date ascending.
pub fn sort_for_table(loans: &mut [LoanWithCalculations]) {
    loans.sort_by(|a, b| {
        match (a.status == LoanStatus::Closed, b.status == LoanStatus::Closed) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.loan.maturity_date.cmp(&b.loan.maturity_date),
        }
    });
}
