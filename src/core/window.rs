use std::fmt::{Debug, Display, Formatter};

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar-month query window with inclusive bounds.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct Window {
    /// First day of the month at 00:00:00.
    pub start: NaiveDateTime,

    /// Last day of the month at 23:59:59.
    pub end: NaiveDateTime,
}

impl Window {
    /// Window covering the whole month which the `date` falls into.
    pub fn month_of(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let last_day = first_day
            .checked_add_months(Months::new(1))
            .and_then(|next_month| next_month.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: first_day.and_time(NaiveTime::MIN),
            end: last_day.and_hms_opt(23, 59, 59).unwrap_or(NaiveDateTime::MAX),
        }
    }
}

impl Debug for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.start, self.end)
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
        write!(f, "{} to {}", self.start.format(FORMAT), self.end.format(FORMAT))
    }
}

/// Iterate calendar-month windows from `begin`'s month through `end`'s month, both inclusive.
///
/// Day-of-month of either bound is ignored: the first window always starts on the 1st,
/// and the last one always covers the entire month containing `end`.
pub fn iterate_months(begin: NaiveDateTime, end: NaiveDateTime) -> MonthWindows {
    MonthWindows { cursor: begin.date().with_day(1), last: (end.year(), end.month()) }
}

#[derive(Clone)]
#[must_use]
pub struct MonthWindows {
    /// First day of the next month to emit, `None` once exhausted.
    cursor: Option<NaiveDate>,

    /// Year and month of the final window.
    last: (i32, u32),
}

impl Iterator for MonthWindows {
    type Item = Window;

    fn next(&mut self) -> Option<Self::Item> {
        let first_day = self.cursor?;
        if (first_day.year(), first_day.month()) > self.last {
            self.cursor = None;
            return None;
        }
        self.cursor = first_day.checked_add_months(Months::new(1));
        Some(Window::month_of(first_day))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use itertools::Itertools;

    use super::*;

    fn at_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, min, sec).unwrap()
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        at_hms(year, month, day, 13, 37, 0)
    }

    #[test]
    fn test_month_of_leap_february() {
        let window = Window::month_of(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(window.start, at_hms(2024, 2, 1, 0, 0, 0));
        assert_eq!(window.end, at_hms(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn test_month_of_regular_february() {
        let window = Window::month_of(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        assert_eq!(window.end.day(), 28);
    }

    #[test]
    fn test_same_year() {
        let windows = iterate_months(at(2022, 3, 17), at(2022, 7, 2)).collect_vec();
        let months = windows.iter().map(|window| window.start.month()).collect_vec();
        assert_eq!(months, [3, 4, 5, 6, 7]);
        for window in &windows {
            assert_eq!(window.start.year(), 2022);
            assert_eq!(window.start.day(), 1);
            assert_eq!(window.start.time(), NaiveTime::MIN);
            assert_eq!(window.end.month(), window.start.month());
            assert_eq!((window.end.hour(), window.end.minute(), window.end.second()), (23, 59, 59));
        }
        let last_days = windows.iter().map(|window| window.end.day()).collect_vec();
        assert_eq!(last_days, [31, 30, 31, 30, 31]);
    }

    #[test]
    fn test_single_month() {
        let windows = iterate_months(at(2022, 12, 31), at(2022, 12, 1)).collect_vec();
        assert_eq!(windows, [Window::month_of(NaiveDate::from_ymd_opt(2022, 12, 1).unwrap())]);
    }

    #[test]
    fn test_end_before_begin_is_empty() {
        assert_eq!(iterate_months(at(2023, 5, 1), at(2023, 4, 30)).count(), 0);
    }

    #[test]
    fn test_leap_years() {
        let februaries = iterate_months(at(2023, 1, 1), at(2024, 12, 31))
            .filter(|window| window.start.month() == 2)
            .map(|window| window.end.day())
            .collect_vec();
        assert_eq!(februaries, [28, 29]);
    }

    #[test]
    fn test_since_2021_until_march_2023() {
        let windows = iterate_months(at(2021, 1, 1), at(2023, 3, 14)).collect_vec();
        assert_eq!(windows.len(), 27);
        assert_eq!(windows[0].start, at_hms(2021, 1, 1, 0, 0, 0));

        // The final window covers the whole month, not just until the 14th:
        let last = windows.last().unwrap();
        assert_eq!(last.end, at_hms(2023, 3, 31, 23, 59, 59));
    }

    #[test]
    fn test_windows_are_contiguous() {
        for (previous, next) in iterate_months(at(2021, 1, 1), at(2023, 3, 14)).tuple_windows() {
            assert_eq!(next.start - previous.end, chrono::TimeDelta::seconds(1));
        }
    }

    #[test]
    fn test_restartable() {
        let windows = iterate_months(at(2021, 6, 15), at(2022, 2, 3));
        assert_eq!(windows.clone().collect_vec(), windows.collect_vec());
        assert_eq!(
            iterate_months(at(2021, 6, 15), at(2022, 2, 3)).collect_vec(),
            iterate_months(at(2021, 6, 15), at(2022, 2, 3)).collect_vec(),
        );
    }

    #[test]
    fn test_display() {
        let window = Window::month_of(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(window.to_string(), "2023-01-01T00:00:00 to 2023-01-31T23:59:59");
    }
}
