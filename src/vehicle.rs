use crate::error::{InvalidFilterError, InvalidPlanError};
use crate::instalment::{project, InstallmentPlan, PaymentProjection};
use chrono::{DateTime, NaiveDate};
use log::warn;
use std::{collections::BTreeSet, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    pub id: String,
    pub plate_number: String,
    pub plate_type: String,
    pub body_type: String,
    pub vehicle_maker: String,
    pub vehicle_model: String,
    pub model_year: String,
    pub major_color: String,
    pub owner_name: String,
    pub department: String,
    pub installment: f64,
    pub deduction_day: u32,
    pub first_installment_date: String,
    pub total_months: i64,
    pub last_installment_date: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub branch_id: Option<String>,
}

impl Vehicle {
    pub fn plan(&self) -> Result<InstallmentPlan, InvalidPlanError> {
        let first = parse_record_date(&self.first_installment_date)?;
        InstallmentPlan::new(first, self.installment, self.total_months)
    }
}

// YYYY-MM-DD, or the date part of an RFC 3339 timestamp
pub fn parse_record_date(raw: &str) -> Result<NaiveDate, InvalidPlanError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| InvalidPlanError::UnparseableDate(raw.to_string()))
}

#[derive(Clone, PartialEq, Debug)]
pub struct VehicleWithPayment {
    pub vehicle: Vehicle,
    pub payment: Result<PaymentProjection, InvalidPlanError>,
}

impl VehicleWithPayment {
    pub fn evaluate(vehicle: Vehicle, as_of: NaiveDate) -> Self {
        let payment = vehicle.plan().map(|plan| project(&plan, as_of));
        if let Err(e) = &payment {
            warn!("vehicle {} has no projection: {}", vehicle.plate_number, e);
        }
        Self { vehicle, payment }
    }
}

pub fn evaluate_all(vehicles: Vec<Vehicle>, as_of: NaiveDate) -> Vec<VehicleWithPayment> {
    vehicles
        .into_iter()
        .map(|v| VehicleWithPayment::evaluate(v, as_of))
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PaymentStatusFilter {
    #[default]
    All,
    Active,
    Completed,
    // min inclusive, max exclusive
    Range(u32, u32),
    AtLeast(u32),
}

impl PaymentStatusFilter {
    pub fn matches(&self, payment: &PaymentProjection) -> bool {
        let remaining = payment.remaining_count;
        match *self {
            PaymentStatusFilter::All => true,
            PaymentStatusFilter::Active => remaining > 0,
            PaymentStatusFilter::Completed => remaining == 0,
            PaymentStatusFilter::Range(min, max) => remaining >= min && remaining < max,
            PaymentStatusFilter::AtLeast(min) => remaining >= min,
        }
    }
}

impl FromStr for PaymentStatusFilter {
    type Err = InvalidFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || InvalidFilterError::UnknownPaymentStatus(s.to_string());
        match s {
            "all" | "" => return Ok(PaymentStatusFilter::All),
            "active" => return Ok(PaymentStatusFilter::Active),
            "completed" => return Ok(PaymentStatusFilter::Completed),
            _ => {}
        }
        if let Some(min) = s.strip_suffix('+') {
            return min
                .parse()
                .map(PaymentStatusFilter::AtLeast)
                .map_err(|_| unknown());
        }
        match s.split_once('-') {
            Some((min, max)) => match (min.parse(), max.parse()) {
                (Ok(min), Ok(max)) => Ok(PaymentStatusFilter::Range(min, max)),
                _ => Err(unknown()),
            },
            None => Err(unknown()),
        }
    }
}

impl fmt::Display for PaymentStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatusFilter::All => write!(f, "all"),
            PaymentStatusFilter::Active => write!(f, "active"),
            PaymentStatusFilter::Completed => write!(f, "completed"),
            PaymentStatusFilter::Range(min, max) => write!(f, "{}-{}", min, max),
            PaymentStatusFilter::AtLeast(min) => write!(f, "{}+", min),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct VehicleFilters {
    pub department: Option<String>,
    pub owner: Option<String>,
    pub deduction_day: Option<u32>,
    pub search_query: Option<String>,
    pub payment_status: PaymentStatusFilter,
}

impl VehicleFilters {
    pub fn matches(&self, row: &VehicleWithPayment) -> bool {
        let v = &row.vehicle;
        if self.department.as_ref().is_some_and(|d| *d != v.department) {
            return false;
        }
        if self.owner.as_ref().is_some_and(|o| *o != v.owner_name) {
            return false;
        }
        if self.deduction_day.is_some_and(|d| d != v.deduction_day) {
            return false;
        }
        if let Some(query) = &self.search_query {
            if !matches_search(v, query) {
                return false;
            }
        }
        match (&self.payment_status, &row.payment) {
            (PaymentStatusFilter::All, _) => true,
            (status, Ok(payment)) => status.matches(payment),
            // rows without a projection cannot be placed in a bucket
            (_, Err(_)) => false,
        }
    }

    pub fn apply<'a>(&self, rows: &'a [VehicleWithPayment]) -> Vec<&'a VehicleWithPayment> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

fn matches_search(v: &Vehicle, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let compact_plate: String = v
        .plate_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    let installment = v.installment.to_string();
    [
        v.plate_number.as_str(),
        v.vehicle_maker.as_str(),
        v.vehicle_model.as_str(),
        installment.as_str(),
        v.department.as_str(),
        v.owner_name.as_str(),
        v.body_type.as_str(),
        compact_plate.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VehicleSummary {
    pub total_vehicles: usize,
    pub total_installments: f64,
    pub departments: usize,
}

pub fn summarize<'a, I>(vehicles: I) -> VehicleSummary
where
    I: IntoIterator<Item = &'a Vehicle>,
{
    let mut departments = BTreeSet::new();
    let mut summary = VehicleSummary::default();
    for v in vehicles {
        summary.total_vehicles += 1;
        summary.total_installments += v.installment;
        departments.insert(v.department.as_str());
    }
    summary.departments = departments.len();
    summary
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub owners: Vec<String>,
    pub deduction_days: Vec<u32>,
}

impl FilterOptions {
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        let departments: BTreeSet<_> = vehicles.iter().map(|v| v.department.clone()).collect();
        let owners: BTreeSet<_> = vehicles.iter().map(|v| v.owner_name.clone()).collect();
        let days: BTreeSet<_> = vehicles.iter().map(|v| v.deduction_day).collect();
        Self {
            departments: departments.into_iter().collect(),
            owners: owners.into_iter().collect(),
            deduction_days: days.into_iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_vehicle(plate: &str, department: &str, owner: &str, day: u32) -> Vehicle {
    Vehicle {
        id: plate.to_string(),
        plate_number: plate.to_string(),
        plate_type: "Private".to_string(),
        body_type: "Pickup".to_string(),
        vehicle_maker: "Toyota".to_string(),
        vehicle_model: "Hilux".to_string(),
        model_year: "2023".to_string(),
        major_color: "White".to_string(),
        owner_name: owner.to_string(),
        department: department.to_string(),
        installment: 1500.,
        deduction_day: day,
        first_installment_date: "2024-01-15".to_string(),
        total_months: 12,
        last_installment_date: "2024-12-15".to_string(),
        branch_id: None,
    }
}
