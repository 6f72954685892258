use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::settings::LocaleSettings;
use crate::task::{Task, TaskId, TaskPatch};

/// Everything that can happen to the calendar view-model.
///
/// User intents and server responses both arrive as events; the model
/// applies them synchronously and answers with [`Effect`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalendarEvent {
    SettingsLoaded {
        settings: LocaleSettings,
        now: NaiveDateTime,
    },
    /// Periodic wall-clock tick.
    Tick {
        now: NaiveDateTime,
    },
    Select {
        date: NaiveDate,
    },
    ShiftMonths {
        months: i32,
    },
    GoToToday,
    Delete {
        id: TaskId,
    },
    ToggleComplete {
        id: TaskId,
        completed: bool,
    },
    /// A task dropped onto a grid cell.
    Move {
        id: TaskId,
        date: NaiveDate,
    },
    Created {
        task: Task,
    },
    ExpiredLoaded {
        tasks: Vec<Task>,
    },
    ScheduledLoaded {
        tasks: Vec<Task>,
    },
    RemoteFailed {
        message: String,
    },
}

/// Remote work requested by the model. Never awaited before the local
/// state change is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    FetchSettings,
    FetchExpired {
        before: NaiveDate,
    },
    FetchScheduled {
        after: NaiveDate,
        before: NaiveDate,
    },
    DeleteTask {
        id: TaskId,
    },
    UpdateTask {
        id: TaskId,
        patch: TaskPatch,
    },
}
