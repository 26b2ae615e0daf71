use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::entities::sea_orm_active_enums::LimitPeriod;

///
/// Inclusive range of calendar dates a spending limit accumulates over.
/// Weeks run Monday through Sunday.
/// 
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn containing(period: LimitPeriod, today: NaiveDate) -> Self {
        match period {
            LimitPeriod::Daily => Self { start: today, end: today },
            LimitPeriod::Weekly => {
                let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                Self { start, end: start + Duration::days(6) }
            },
            LimitPeriod::Monthly => {
                let start = today - Duration::days(today.day0() as i64);
                Self { start, end: last_day_before(start, Months::new(1)) }
            },
            LimitPeriod::Yearly => {
                let start = today - Duration::days(today.ordinal0() as i64);
                Self { start, end: last_day_before(start, Months::new(12)) }
            },
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Last date of the window that counts as spent on `today`
    pub fn spent_until(&self, today: NaiveDate) -> NaiveDate {
        self.end.min(today).max(self.start)
    }
}

fn last_day_before(start: NaiveDate, months: Months) -> NaiveDate {
    start.checked_add_months(months)
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_window() {
        let window = PeriodWindow::containing(LimitPeriod::Daily, date(2024, 11, 10));
        assert_eq!(date(2024, 11, 10), window.start);
        assert_eq!(date(2024, 11, 10), window.end);
    }

    #[test]
    fn test_weekly_window_starts_monday() {
        // 2024-11-10 is a Sunday
        let window = PeriodWindow::containing(LimitPeriod::Weekly, date(2024, 11, 10));
        assert_eq!(date(2024, 11, 4), window.start);
        assert_eq!(date(2024, 11, 10), window.end);

        let window = PeriodWindow::containing(LimitPeriod::Weekly, date(2024, 11, 11));
        assert_eq!(date(2024, 11, 11), window.start);
        assert_eq!(date(2024, 11, 17), window.end);

        // Spans a year boundary
        let window = PeriodWindow::containing(LimitPeriod::Weekly, date(2025, 1, 1));
        assert_eq!(date(2024, 12, 30), window.start);
        assert_eq!(date(2025, 1, 5), window.end);
    }

    #[test]
    fn test_monthly_window() {
        let window = PeriodWindow::containing(LimitPeriod::Monthly, date(2024, 2, 15));
        assert_eq!(date(2024, 2, 1), window.start);
        assert_eq!(date(2024, 2, 29), window.end);

        let window = PeriodWindow::containing(LimitPeriod::Monthly, date(2024, 12, 31));
        assert_eq!(date(2024, 12, 1), window.start);
        assert_eq!(date(2024, 12, 31), window.end);
    }

    #[test]
    fn test_yearly_window() {
        let window = PeriodWindow::containing(LimitPeriod::Yearly, date(2024, 11, 10));
        assert_eq!(date(2024, 1, 1), window.start);
        assert_eq!(date(2024, 12, 31), window.end);
        assert!(window.contains(date(2024, 6, 1)));
        assert!(!window.contains(date(2025, 1, 1)));
    }

    #[test]
    fn test_spent_until_stops_at_today() {
        let window = PeriodWindow::containing(LimitPeriod::Monthly, date(2024, 11, 10));
        assert_eq!(date(2024, 11, 10), window.spent_until(date(2024, 11, 10)));
        assert_eq!(date(2024, 11, 30), window.end);

        let window = PeriodWindow::containing(LimitPeriod::Weekly, date(2024, 11, 4));
        assert_eq!(date(2024, 11, 4), window.spent_until(date(2024, 11, 4)));

        // A window already over counts through its last day
        let past = PeriodWindow::containing(LimitPeriod::Monthly, date(2024, 10, 15));
        assert_eq!(date(2024, 10, 31), past.spent_until(date(2024, 11, 10)));
    }
}
