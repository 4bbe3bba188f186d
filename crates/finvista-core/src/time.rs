//! Calendar-month helpers for the time-bucketed reports

use chrono::{Datelike, NaiveDate};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn next_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(date)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).unwrap_or(date)
    }
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    next_month(date).pred_opt().unwrap_or(date)
}

/// First-of-month dates for every calendar month from `start` to `end`,
/// inclusive on both sides
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut cursor = month_start(start);
    let last = month_start(end);
    while cursor <= last {
        months.push(cursor);
        cursor = next_month(cursor);
    }
    months
}

/// Display label for a month, e.g. "Mar 2024"
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_start(date(2024, 2, 17)), date(2024, 2, 1));
        assert_eq!(month_end(date(2024, 2, 17)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 12, 5)), date(2023, 12, 31));
    }

    #[test]
    fn test_months_between_spans_year_boundary() {
        let months = months_between(date(2023, 11, 20), date(2024, 2, 3));
        assert_eq!(
            months,
            vec![
                date(2023, 11, 1),
                date(2023, 12, 1),
                date(2024, 1, 1),
                date(2024, 2, 1),
            ]
        );
    }

    #[test]
    fn test_months_between_single_month() {
        let months = months_between(date(2024, 5, 3), date(2024, 5, 28));
        assert_eq!(months, vec![date(2024, 5, 1)]);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(date(2024, 1, 1)), "Jan 2024");
    }
}
