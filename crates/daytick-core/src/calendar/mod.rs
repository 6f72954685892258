//! Calendar view-model: month window, today resolution and task buckets.

pub mod buckets;
pub mod model;
pub mod ticker;
pub mod today;
pub mod window;

pub use buckets::{TaskBuckets, TaskStatus};
pub use model::CalendarModel;
pub use ticker::{spawn_ticker_with_clock, spawn_today_ticker, TickerHandle, DEFAULT_TICK_PERIOD};
pub use today::{TodayResolver, TodayUpdate};
pub use window::{shift_months, CalendarWindow};
