//! "Today" resolution against the user's rollover time.
//!
//! A user whose day rolls over at 04:00 is still on Monday at 03:59 on
//! Tuesday's wall clock. The resolver also decides whether a selection that
//! was following "today" should move along with it.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::settings::RolloverTime;

/// Computes the current calendar day from wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodayResolver {
    rollover: RolloverTime,
}

/// Outcome of one resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayUpdate {
    pub today: NaiveDate,
    pub selected: NaiveDate,
    /// `today` differs from the previously tracked value.
    pub today_changed: bool,
    /// `selected` was advanced to follow `today`.
    pub selection_followed: bool,
}

impl TodayResolver {
    pub fn new(rollover: RolloverTime) -> Self {
        Self { rollover }
    }

    pub fn rollover(&self) -> RolloverTime {
        self.rollover
    }

    /// `(now - rollover)` truncated to a date.
    pub fn today_at(&self, now: NaiveDateTime) -> NaiveDate {
        (now - self.rollover.as_duration()).date()
    }

    /// Today according to the local wall clock.
    pub fn today(&self) -> NaiveDate {
        self.today_at(Local::now().naive_local())
    }

    /// Recompute today and carry a following selection along.
    ///
    /// `previous` is the last computed today, `None` before the first pass.
    /// Before the first pass, or when the selection equals `previous`, the
    /// selection follows the new value; anything else is left alone.
    pub fn advance(
        &self,
        now: NaiveDateTime,
        previous: Option<NaiveDate>,
        selected: Option<NaiveDate>,
    ) -> TodayUpdate {
        let today = self.today_at(now);
        let following = match (previous, selected) {
            (Some(prev), Some(sel)) => prev == sel,
            _ => true,
        };
        let selected = match selected {
            Some(sel) if !following => sel,
            _ => today,
        };
        TodayUpdate {
            today,
            selected,
            today_changed: previous != Some(today),
            selection_followed: following && previous != Some(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn midnight_rollover_is_plain_date() {
        let r = TodayResolver::default();
        assert_eq!(r.today_at(at("2024-02-15 00:00")), date("2024-02-15"));
        assert_eq!(r.today_at(at("2024-02-15 23:59")), date("2024-02-15"));
    }

    #[test]
    fn late_rollover_keeps_previous_day() {
        let r = TodayResolver::new("04:00".parse().unwrap());
        assert_eq!(r.today_at(at("2024-02-16 03:59")), date("2024-02-15"));
        assert_eq!(r.today_at(at("2024-02-16 04:00")), date("2024-02-16"));
    }

    #[test]
    fn rollover_crosses_month_boundary() {
        let r = TodayResolver::new("06:00".parse().unwrap());
        assert_eq!(r.today_at(at("2024-03-01 05:00")), date("2024-02-29"));
    }

    #[test]
    fn following_selection_advances() {
        let r = TodayResolver::default();
        let update = r.advance(
            at("2024-02-16 00:01"),
            Some(date("2024-02-15")),
            Some(date("2024-02-15")),
        );
        assert_eq!(update.today, date("2024-02-16"));
        assert_eq!(update.selected, date("2024-02-16"));
        assert!(update.today_changed);
        assert!(update.selection_followed);
    }

    #[test]
    fn manual_selection_is_left_alone() {
        let r = TodayResolver::default();
        let update = r.advance(
            at("2024-02-16 00:01"),
            Some(date("2024-02-15")),
            Some(date("2024-03-10")),
        );
        assert_eq!(update.selected, date("2024-03-10"));
        assert!(!update.selection_followed);
    }

    #[test]
    fn full_day_rollover_lags_one_day() {
        let r = TodayResolver::new(RolloverTime::from_hm(24, 0).unwrap());
        assert_eq!(r.today_at(at("2024-03-10 23:59")), date("2024-03-09"));
        assert_eq!(r.today_at(at("2024-03-11 00:00")), date("2024-03-10"));
    }

    #[test]
    fn first_pass_seeds_selection() {
        let r = TodayResolver::default();
        let update = r.advance(at("2024-02-15 12:00"), None, None);
        assert_eq!(update.selected, date("2024-02-15"));
        assert!(update.today_changed);
    }

    #[test]
    fn same_day_tick_changes_nothing() {
        let r = TodayResolver::default();
        let update = r.advance(
            at("2024-02-15 18:00"),
            Some(date("2024-02-15")),
            Some(date("2024-02-15")),
        );
        assert!(!update.today_changed);
        assert!(!update.selection_followed);
    }
}
