//! # Daytick Core Library
//!
//! Client-side logic for the daytick month calendar: a task list laid out on
//! a month grid, kept in sync with a remote task server.
//!
//! ## Architecture
//!
//! - **Calendar**: Month grid arithmetic, the rollover-aware notion of
//!   "today", the expired/scheduled task buckets and the event-driven
//!   [`CalendarModel`] that ties them together
//! - **Gateway**: The [`TaskGateway`] trait and its reqwest-backed
//!   [`HttpGateway`] implementation
//! - **Session**: Async shell that dispatches model effects to a gateway
//!   without waiting on them
//! - **Storage**: TOML-based client configuration
//!
//! ## Key Components
//!
//! - [`CalendarModel`]: Pure state machine, `apply(event) -> effects`
//! - [`CalendarSession`]: Owns a model, a gateway and the today ticker
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod error;
pub mod events;
pub mod gateway;
pub mod search;
pub mod session;
pub mod settings;
pub mod storage;
pub mod task;

pub use calendar::{
    shift_months, spawn_today_ticker, CalendarModel, CalendarWindow, TaskBuckets, TaskStatus,
    TickerHandle, TodayResolver, DEFAULT_TICK_PERIOD,
};
pub use error::{ConfigError, CoreError, GatewayError, ValidationError};
pub use events::{CalendarEvent, Effect};
pub use gateway::{HttpGateway, TaskGateway};
pub use search::{search, SearchPage, SearchRequest};
pub use session::{local_clock, CalendarSession, Clock};
pub use settings::{LocaleSettings, LocaleSettingsPatch, RolloverTime, WeekStart};
pub use storage::Config;
pub use task::{
    NewTask, OrderColumn, OrderDirection, Task, TaskCount, TaskFilter, TaskId, TaskPatch,
    TaskQuery,
};
