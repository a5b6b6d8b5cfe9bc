use chrono::NaiveDate;
use instalments::bank_loan::{compute_by_recorded_payments, Bank, BankLoan, LoanStatus, Payment};
use instalments::deduction::deduction_kpis;
use instalments::vehicle::{evaluate_all, summarize, Vehicle};
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let today = chrono::Local::now().date_naive();

    let vehicles = vec![
        vehicle("4521 RKA", "Frozen", "Osaimi", 1850., 6, "2024-01-06", 36),
        vehicle("7310 LMB", "Qurban", "Waleed", 2100., 8, "2023-08-08", 24),
        vehicle("1198 HDA", "Mada", "Hassan", 1500., 14, "2024-01-31", 48),
        vehicle("9902 XRT", "Mada", "Hassan", 990., 15, "2025-13-01", 12),
    ];

    let summary = summarize(&vehicles);
    info!(
        "{} vehicles across {} departments, {:.2} due monthly",
        summary.total_vehicles, summary.departments, summary.total_installments
    );

    for kpi in deduction_kpis(&vehicles, today) {
        match kpi.next_date {
            Some(next) => info!(
                "{}: {} vehicles, {:.2} on {}",
                kpi.label, kpi.vehicle_count, kpi.total_amount, next
            ),
            None => warn!("{}: no next deduction date", kpi.label),
        }
    }

    for row in evaluate_all(vehicles, today) {
        match row.payment {
            Ok(p) => info!("{}: {}", row.vehicle.plate_number, p),
            Err(e) => warn!("{}: N/A ({})", row.vehicle.plate_number, e),
        }
    }

    let loan = BankLoan::new(
        "loan-1",
        "Jebreel",
        NaiveDate::from_ymd_opt(2024, 2, 15).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2026, 2, 15).ok_or("bad date")?,
        200000.,
        224000.,
        Bank::AhliBank,
        LoanStatus::Active,
    )?;
    let payments = vec![Payment {
        id: "pmt-1".to_string(),
        loan_id: "loan-1".to_string(),
        amount: 56000.,
        principal_amount: 50000.,
        interest_amount: 6000.,
        payment_date: NaiveDate::from_ymd_opt(2024, 8, 15).ok_or("bad date")?,
        description: Some("first tranche".to_string()),
    }];
    let calc = compute_by_recorded_payments(&loan, &payments, today);
    info!(
        "{} loan {}: paid {:.2}, remaining {:.2}, {} ({} days to maturity)",
        calc.loan.bank, calc.loan.id, calc.total_paid, calc.remaining_amount, calc.status, calc.remaining_days
    );

    Ok(())
}

fn vehicle(
    plate: &str,
    department: &str,
    owner: &str,
    installment: f64,
    deduction_day: u32,
    first_installment_date: &str,
    total_months: i64,
) -> Vehicle {
    Vehicle {
        id: plate.to_string(),
        plate_number: plate.to_string(),
        owner_name: owner.to_string(),
        department: department.to_string(),
        installment,
        deduction_day,
        first_installment_date: first_installment_date.to_string(),
        total_months,
        ..Default::default()
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    use instalments::{InstallmentPlan, PaymentProjection};

    is_normal::<InstallmentPlan>();
    is_normal::<PaymentProjection>();
    is_normal::<BankLoan>();
    is_normal::<Vehicle>();
}
