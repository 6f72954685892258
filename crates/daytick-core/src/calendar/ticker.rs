//! Periodic "today" recomputation.
//!
//! The ticker is a spawned tokio task that posts [`CalendarEvent::Tick`]
//! into the session's event channel. It lives exactly as long as its
//! [`TickerHandle`]: dropping or cancelling the handle aborts the task.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::events::CalendarEvent;

/// Default recomputation period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Owner of a running ticker task.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop the ticker. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a ticker that reads the local wall clock.
///
/// Must be called from within a tokio runtime.
pub fn spawn_today_ticker(period: Duration, tx: UnboundedSender<CalendarEvent>) -> TickerHandle {
    spawn_ticker_with_clock(period, tx, || Local::now().naive_local())
}

/// Spawn a ticker with an injected clock.
///
/// The first tick fires one `period` after spawning; the eager computation
/// happens when settings load. The task ends on its own once the receiving
/// side of `tx` is gone.
pub fn spawn_ticker_with_clock<F>(
    period: Duration,
    tx: UnboundedSender<CalendarEvent>,
    clock: F,
) -> TickerHandle
where
    F: Fn() -> NaiveDateTime + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let now = clock();
            if tx.send(CalendarEvent::Tick { now }).is_err() {
                debug!("event channel closed; stopping today ticker");
                break;
            }
        }
    });
    TickerHandle { task }
}
