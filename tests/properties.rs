use chrono::{Datelike, Days, NaiveDate};
use instalments::calendar::add_calendar_months;
use instalments::{project, InstallmentPlan};
use proptest::prelude::*;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date + Days::new(days as u64)
    } else {
        date - Days::new(days.unsigned_abs())
    }
}

prop_compose! {
    fn plans()(
        start in 0i64..15_000,
        amount in 0.01f64..100_000.,
        term in 1i64..=120,
    ) -> InstallmentPlan {
        InstallmentPlan::new(shift(epoch(), start), amount, term).unwrap()
    }
}

proptest! {
    #[test]
    fn counts_and_amounts_add_up(plan in plans(), offset in -400i64..4_000) {
        let p = project(&plan, shift(plan.first_payment_date(), offset));

        prop_assert!(p.paid_count <= plan.term_months());
        prop_assert_eq!(p.paid_count + p.remaining_count, plan.term_months());
        prop_assert!((p.paid_amount + p.remaining_amount - p.total_amount).abs() <= 1e-6 * p.total_amount);
        prop_assert!(p.remaining_amount >= 0.);
        prop_assert!((0. ..=1.).contains(&p.progress_fraction));
        prop_assert!(p.days_until_next_due >= 0);
    }

    #[test]
    fn paid_count_never_decreases(plan in plans(), a in -400i64..4_000, step in 0i64..400) {
        let earlier = project(&plan, shift(plan.first_payment_date(), a));
        let later = project(&plan, shift(plan.first_payment_date(), a + step));
        prop_assert!(earlier.paid_count <= later.paid_count);
    }

    #[test]
    fn nothing_paid_before_first_date(plan in plans(), before in 1i64..1_000) {
        let p = project(&plan, shift(plan.first_payment_date(), -before));
        prop_assert_eq!(p.paid_count, 0);
        prop_assert_eq!(p.next_due_date, plan.first_payment_date());
        prop_assert!(!p.is_overdue);
    }

    #[test]
    fn complete_after_last_date(plan in plans(), after in 0i64..1_000) {
        let end = add_calendar_months(plan.first_payment_date(), plan.term_months()).unwrap();
        let p = project(&plan, shift(end, after));
        prop_assert_eq!(p.paid_count, plan.term_months());
        prop_assert_eq!(p.remaining_count, 0);
        prop_assert_eq!(p.remaining_amount, 0.);
        prop_assert!(!p.is_overdue);
        prop_assert!(p.is_complete());
    }

    #[test]
    fn due_date_itself_counts_as_paid(plan in plans(), offset in -400i64..4_000) {
        let p = project(&plan, shift(plan.first_payment_date(), offset));
        prop_assume!(!p.is_complete());

        let on_due = project(&plan, p.next_due_date);
        prop_assert_eq!(on_due.paid_count, p.paid_count + 1);
    }

    #[test]
    fn open_plans_are_never_overdue(plan in plans(), offset in -400i64..4_000) {
        // next due date is always the first one still ahead of the evaluation date
        let p = project(&plan, shift(plan.first_payment_date(), offset));
        prop_assert!(!p.is_overdue);
    }

    #[test]
    fn month_steps_clamp_to_month_end(start in 0i64..15_000, months in 0u32..240) {
        let date = shift(epoch(), start);
        let moved = add_calendar_months(date, months).unwrap();

        let month_index = |d: NaiveDate| d.year() * 12 + d.month0() as i32;
        prop_assert_eq!(month_index(moved) - month_index(date), months as i32);
        prop_assert!(moved.day() <= date.day());
        if moved.day() < date.day() {
            // clamped: the following day starts a new month
            prop_assert_eq!(moved.succ_opt().unwrap().day(), 1);
        }
    }
}
