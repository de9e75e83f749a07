//! Calendar-month window used to scope the keyword job.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

/// Half-open interval `[first of month, first of next month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl MonthWindow {
    /// Window for the calendar month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Days::new(u64::from(date.day0()));
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start.and_hms_opt(0, 0, 0).unwrap_or_default()
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end.and_hms_opt(0, 0, 0).unwrap_or_default()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start() && at < self.end()
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_mid_month_window() {
        let window = MonthWindow::containing(date(2024, 3, 15));

        assert_eq!(window.start(), at(2024, 3, 1, 0));
        assert_eq!(window.end(), at(2024, 4, 1, 0));
        assert_eq!((window.year(), window.month()), (2024, 3));
        assert_eq!(window.to_string(), "[2024-03-01, 2024-04-01)");
    }

    #[test]
    fn test_boundaries() {
        let window = MonthWindow::containing(date(2024, 3, 15));

        assert!(!window.contains(at(2024, 2, 28, 12)));
        assert!(!window.contains(at(2024, 2, 29, 23)));
        assert!(window.contains(at(2024, 3, 1, 0)));
        assert!(window.contains(at(2024, 3, 31, 23)));
        assert!(!window.contains(at(2024, 4, 1, 0)));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let window = MonthWindow::containing(date(2023, 12, 31));
        assert_eq!(window.start(), at(2023, 12, 1, 0));
        assert_eq!(window.end(), at(2024, 1, 1, 0));
    }

    #[test]
    fn test_first_day_is_its_own_month() {
        let window = MonthWindow::containing(date(2024, 2, 1));
        assert_eq!(window.end(), at(2024, 3, 1, 0));
    }
}
