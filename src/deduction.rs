use crate::calendar::add_calendar_months;
use crate::vehicle::Vehicle;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::trace;

pub const IMMINENT_DAYS: i64 = 3;

// today counts; None for a day outside 1..=31
pub fn next_deduction_date(day: u32, today: NaiveDate) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let this_month = today.with_day(1)?;
    let month = if today.day() <= day {
        this_month
    } else {
        add_calendar_months(this_month, 1)?
    };
    month
        .with_day(day)
        .or_else(|| add_calendar_months(month, 1)?.pred_opt())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    pub fn is_imminent(&self) -> bool {
        self.days <= IMMINENT_DAYS
    }
}

/// Time left from `now` until midnight starting `target`, zero once reached.
pub fn countdown(target: NaiveDate, now: NaiveDateTime) -> Countdown {
    let Some(midnight) = target.and_hms_opt(0, 0, 0) else {
        return Countdown::default();
    };
    let diff = midnight - now;
    if diff <= chrono::Duration::zero() {
        return Countdown::default();
    }
    Countdown {
        days: diff.num_days(),
        hours: diff.num_hours() % 24,
        minutes: diff.num_minutes() % 60,
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct DeductionKpi {
    pub label: &'static str,
    pub days: &'static [u32],
    pub vehicle_count: usize,
    pub total_amount: f64,
    pub next_date: Option<NaiveDate>,
    pub urgent: bool,
}

const GROUPS: [(&str, &[u32], bool); 3] = [
    ("early_month", &[6], true),
    ("mid_month", &[8, 9], false),
    ("mid_late", &[14, 15], false),
];

pub fn deduction_kpis(vehicles: &[Vehicle], today: NaiveDate) -> Vec<DeductionKpi> {
    GROUPS
        .iter()
        .map(|&(label, days, urgent)| {
            let (vehicle_count, total_amount) = vehicles
                .iter()
                .filter(|v| days.contains(&v.deduction_day))
                .fold((0, 0.), |(n, sum), v| (n + 1, sum + v.installment));
            trace!("{}: {} vehicles, {} total", label, vehicle_count, total_amount);
            DeductionKpi {
                label,
                days,
                vehicle_count,
                total_amount,
                // the card counts down to the first day of its group
                next_date: next_deduction_date(days[0], today),
                urgent,
            }
        })
        .collect()
}
