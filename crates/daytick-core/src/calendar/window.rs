//! Month window calculation.
//!
//! A window is the whole-week padded grid rendered for the month containing
//! the selected date. It is a pure function of `(selected, week_start)`:
//!
//! ```text
//!   grid_start   month_start            month_end   grid_end
//!       |............|.......................|..........|
//!       ^ weekday == week_start                         ^ weekday == week_start - 1
//! ```

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::settings::WeekStart;

/// Padded month grid derived from a selected date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub selected: NaiveDate,
    pub week_start: WeekStart,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub grid_start: NaiveDate,
    pub grid_end: NaiveDate,
    pub grid: Vec<NaiveDate>,
}

impl CalendarWindow {
    /// Compute the window for `selected` with columns starting on `week_start`.
    pub fn compute(selected: NaiveDate, week_start: WeekStart) -> Self {
        let start = i64::from(week_start.iso());

        let month_start = first_of_month(selected);
        let month_end = last_of_month(selected);

        let lead = (7 + iso_weekday(month_start) - start) % 7;
        let grid_start = month_start - Duration::days(lead);

        let trail = (7 - ((7 + iso_weekday(month_end) - start) % 7) - 1) % 7;
        let grid_end = month_end + Duration::days(trail);

        let grid: Vec<NaiveDate> = grid_start
            .iter_days()
            .take_while(|d| *d <= grid_end)
            .collect();

        Self {
            selected,
            week_start,
            month_start,
            month_end,
            grid_start,
            grid_end,
            grid,
        }
    }

    /// Display title, e.g. "February 2024".
    pub fn title(&self) -> String {
        self.selected.format("%B %Y").to_string()
    }

    /// Exclusive `(after, before)` bounds that make the server return exactly
    /// the tasks planned inside the grid.
    pub fn query_bounds(&self) -> (NaiveDate, NaiveDate) {
        (
            self.grid_start - Duration::days(1),
            self.grid_end + Duration::days(1),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.grid_start <= date && date <= self.grid_end
    }

    /// Whether `date` belongs to the month itself rather than the padding.
    pub fn in_month(&self, date: NaiveDate) -> bool {
        self.month_start <= date && date <= self.month_end
    }

    /// Grid rows, one per week.
    pub fn weeks(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.grid.chunks(7)
    }

    pub fn weekday_labels(&self) -> [Weekday; 7] {
        self.week_start.columns()
    }
}

/// Move `date` by `months`, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

fn iso_weekday(date: NaiveDate) -> i64 {
    i64::from(date.weekday().number_from_monday())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn leap_february_monday_start() {
        let w = CalendarWindow::compute(date("2024-02-15"), WeekStart::MONDAY);
        assert_eq!(w.month_start, date("2024-02-01"));
        assert_eq!(w.month_end, date("2024-02-29"));
        assert_eq!(w.grid_start, date("2024-01-29"));
        assert_eq!(w.grid_end, date("2024-03-03"));
        assert_eq!(w.grid.len(), 35);
        assert_eq!(w.title(), "February 2024");
    }

    #[test]
    fn sunday_start_pads_back_to_sunday() {
        let w = CalendarWindow::compute(date("2024-02-15"), WeekStart::SUNDAY);
        assert_eq!(w.grid_start, date("2024-01-28"));
        assert_eq!(w.grid_end, date("2024-03-02"));
        assert_eq!(w.grid_start.weekday(), Weekday::Sun);
        assert_eq!(w.grid_end.weekday(), Weekday::Sat);
    }

    #[test]
    fn month_starting_on_week_start_has_no_leading_padding() {
        // 2024-04-01 is a Monday, 2024-06-30 a Sunday.
        let w = CalendarWindow::compute(date("2024-04-10"), WeekStart::MONDAY);
        assert_eq!(w.grid_start, date("2024-04-01"));
        let w = CalendarWindow::compute(date("2024-06-10"), WeekStart::MONDAY);
        assert_eq!(w.grid_end, date("2024-06-30"));
    }

    #[test]
    fn four_week_february() {
        // 2021-02-01 is a Monday and the month has exactly 28 days.
        let w = CalendarWindow::compute(date("2021-02-14"), WeekStart::MONDAY);
        assert_eq!(w.grid.len(), 28);
        assert_eq!(w.weeks().count(), 4);
    }

    #[test]
    fn query_bounds_are_exclusive_neighbours() {
        let w = CalendarWindow::compute(date("2024-02-15"), WeekStart::MONDAY);
        assert_eq!(w.query_bounds(), (date("2024-01-28"), date("2024-03-04")));
    }

    #[test]
    fn padding_days_are_in_grid_but_not_in_month() {
        let w = CalendarWindow::compute(date("2024-02-15"), WeekStart::MONDAY);
        assert!(w.contains(date("2024-01-29")));
        assert!(!w.in_month(date("2024-01-29")));
        assert!(!w.contains(date("2024-01-28")));
    }

    #[test]
    fn shift_months_clamps_day() {
        assert_eq!(shift_months(date("2024-01-31"), 1), date("2024-02-29"));
        assert_eq!(shift_months(date("2024-03-31"), -1), date("2024-02-29"));
        assert_eq!(shift_months(date("2024-12-15"), 1), date("2025-01-15"));
    }
}
