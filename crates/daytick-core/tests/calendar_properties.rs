//! Property tests for the month grid, today resolution and bucket
//! mutations.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use daytick_core::calendar::{CalendarWindow, TaskBuckets, TodayResolver};
use daytick_core::settings::{RolloverTime, WeekStart};
use daytick_core::task::Task;
use proptest::prelude::*;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2200, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .or_else(|| NaiveDate::from_ymd_opt(y, m, 28))
            .unwrap()
    })
}

fn any_week_start() -> impl Strategy<Value = WeekStart> {
    (1i64..=7).prop_map(|n| WeekStart::new(n).unwrap())
}

fn any_rollover() -> impl Strategy<Value = RolloverTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| RolloverTime::from_hm(h, m).unwrap())
}

fn any_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn task(id: u64, planned_at: NaiveDate, completed: bool) -> Task {
    Task {
        id,
        title: format!("task {id}"),
        planned_at,
        completed,
        created_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn grid_is_whole_weeks_starting_on_week_start(selected in any_date(), ws in any_week_start()) {
        let w = CalendarWindow::compute(selected, ws);
        prop_assert_eq!(w.grid.len() % 7, 0);
        prop_assert!(w.grid.len() >= 28 && w.grid.len() <= 42);
        prop_assert_eq!(w.grid[0].weekday(), ws.weekday());
        prop_assert_eq!(w.grid[0], w.grid_start);
        prop_assert_eq!(*w.grid.last().unwrap(), w.grid_end);
    }

    #[test]
    fn grid_is_contiguous_and_covers_month(selected in any_date(), ws in any_week_start()) {
        let w = CalendarWindow::compute(selected, ws);
        for pair in w.grid.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        prop_assert!(w.grid_start <= w.month_start);
        prop_assert!(w.grid_end >= w.month_end);
        prop_assert!(w.month_start - w.grid_start < Duration::days(7));
        prop_assert!(w.grid_end - w.month_end < Duration::days(7));
        prop_assert!(w.contains(selected));
        prop_assert!(w.in_month(selected));
    }

    #[test]
    fn query_bounds_are_exclusive_neighbours(selected in any_date(), ws in any_week_start()) {
        let w = CalendarWindow::compute(selected, ws);
        let (after, before) = w.query_bounds();
        prop_assert_eq!(after + Duration::days(1), w.grid_start);
        prop_assert_eq!(before - Duration::days(1), w.grid_end);
    }

    #[test]
    fn today_is_date_of_shifted_clock(
        day in any_date(),
        time in any_time(),
        rollover in any_rollover(),
    ) {
        let now = NaiveDateTime::new(day, time);
        let resolver = TodayResolver::new(rollover);
        let today = resolver.today_at(now);
        prop_assert_eq!(today, (now - rollover.as_duration()).date());
        prop_assert!(today == day || today == day - Duration::days(1));
        let again = resolver.advance(now, Some(today), Some(today));
        prop_assert!(!again.today_changed);
        prop_assert_eq!(again.selected, today);
    }

    #[test]
    fn completed_tasks_never_stay_expired(
        planned in any_date(),
        target in any_date(),
        today in any_date(),
    ) {
        let mut buckets = TaskBuckets::new();
        let t = task(1, planned, false);
        buckets.load_expired(vec![t.clone()]);
        buckets.load_scheduled(vec![t]);

        buckets.toggle_complete(1, true, today);
        prop_assert!(!buckets.is_expired(1));
        prop_assert!(buckets.move_task(1, target, today));
        prop_assert!(!buckets.is_expired(1));
        prop_assert_eq!(buckets.get(1).unwrap().planned_at, target);
    }

    #[test]
    fn moved_incomplete_task_is_expired_iff_before_today(
        planned in any_date(),
        target in any_date(),
        today in any_date(),
    ) {
        let mut buckets = TaskBuckets::new();
        buckets.load_scheduled(vec![task(1, planned, false)]);
        buckets.move_task(1, target, today);
        prop_assert_eq!(buckets.is_expired(1), target < today);
        prop_assert!(buckets.is_scheduled(1));
    }

    #[test]
    fn delete_clears_both_buckets(planned in any_date()) {
        let mut buckets = TaskBuckets::new();
        let t = task(9, planned, false);
        buckets.load_expired(vec![t.clone()]);
        buckets.load_scheduled(vec![t]);
        prop_assert!(buckets.delete(9));
        prop_assert!(buckets.get(9).is_none());
        prop_assert!(buckets.tasks_on(planned).is_empty());
        prop_assert!(!buckets.delete(9));
    }
}

#[test]
fn leap_february_with_monday_start() {
    let selected = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    let w = CalendarWindow::compute(selected, WeekStart::MONDAY);
    assert_eq!(w.grid.len(), 35);
    assert_eq!(w.grid_start, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    assert_eq!(w.grid_end, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    assert_eq!(w.title(), "February 2024");
}

#[test]
fn rollover_keeps_yesterday_until_rollover_time() {
    let resolver = TodayResolver::new(RolloverTime::from_hm(4, 0).unwrap());
    let early = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(3, 59, 0)
        .unwrap();
    assert_eq!(
        resolver.today_at(early),
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    );
    assert_eq!(
        resolver.today_at(early + Duration::minutes(1)),
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    );
}
