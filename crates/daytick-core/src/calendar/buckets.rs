//! Expired/scheduled bucket reconciliation.
//!
//! Two independent server reads fill the buckets:
//!
//! - **expired**: incomplete tasks planned before today
//! - **scheduled**: every task planned inside the visible grid
//!
//! A task can sit in both. Each mutation below is applied locally before the
//! server has confirmed it, and it updates both copies of a task together so
//! that the buckets never disagree about the same id. When a stale overlap
//! exists going into an operation, the scheduled copy is the base.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::window::CalendarWindow;
use crate::task::{Task, TaskId};

/// Where a task stands relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Done,
    Overdue,
    DueToday,
    Upcoming,
}

impl TaskStatus {
    pub fn of(task: &Task, today: NaiveDate) -> Self {
        if task.completed {
            TaskStatus::Done
        } else if task.planned_at < today {
            TaskStatus::Overdue
        } else if task.planned_at == today {
            TaskStatus::DueToday
        } else {
            TaskStatus::Upcoming
        }
    }
}

/// The two client-side task buckets, each keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    expired: BTreeMap<TaskId, Task>,
    scheduled: BTreeMap<TaskId, Task>,
}

impl TaskBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Expired tasks, oldest plan date first.
    pub fn expired(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.expired.values().collect();
        tasks.sort_by_key(|t| (t.planned_at, t.id));
        tasks
    }

    /// Scheduled tasks ordered by id.
    pub fn scheduled(&self) -> impl Iterator<Item = &Task> {
        self.scheduled.values()
    }

    /// Scheduled tasks planned on `date`.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<&Task> {
        self.scheduled
            .values()
            .filter(|t| t.planned_at == date)
            .collect()
    }

    pub fn is_expired(&self, id: TaskId) -> bool {
        self.expired.contains_key(&id)
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.scheduled.contains_key(&id)
    }

    /// The logical task for `id`, preferring the scheduled copy.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.scheduled.get(&id).or_else(|| self.expired.get(&id))
    }

    pub fn expired_len(&self) -> usize {
        self.expired.len()
    }

    pub fn scheduled_len(&self) -> usize {
        self.scheduled.len()
    }

    // ── Loads ────────────────────────────────────────────────────────

    /// Replace the expired bucket wholesale with a server read.
    pub fn load_expired(&mut self, tasks: Vec<Task>) {
        self.expired = tasks.into_iter().map(|t| (t.id, t)).collect();
    }

    /// Replace the scheduled bucket wholesale with a server read.
    pub fn load_scheduled(&mut self, tasks: Vec<Task>) {
        self.scheduled = tasks.into_iter().map(|t| (t.id, t)).collect();
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Drop `id` from both buckets. Returns whether anything was removed.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let expired = self.expired.remove(&id).is_some();
        let scheduled = self.scheduled.remove(&id).is_some();
        expired || scheduled
    }

    /// Mark `id` complete or incomplete.
    ///
    /// Completing always clears the expired entry. Un-completing a scheduled
    /// task that is planned before `today` puts it back into expired.
    pub fn toggle_complete(&mut self, id: TaskId, completed: bool, today: NaiveDate) {
        if completed {
            self.expired.remove(&id);
            if let Some(task) = self.scheduled.get_mut(&id) {
                task.completed = true;
            }
            return;
        }

        let Some(task) = self.scheduled.get_mut(&id) else {
            return;
        };
        task.completed = false;
        if task.planned_at < today {
            let copy = task.clone();
            self.expired.insert(id, copy);
        } else {
            self.expired.remove(&id);
        }
    }

    /// Reschedule `id` onto `date`.
    ///
    /// The task always lands in scheduled. Completed tasks never sit in
    /// expired; otherwise the expired entry follows the new date. Returns
    /// false when neither bucket knows the id.
    pub fn move_task(&mut self, id: TaskId, date: NaiveDate, today: NaiveDate) -> bool {
        let Some(mut task) = self.get(id).cloned() else {
            return false;
        };
        task.planned_at = date;

        if task.completed || date >= today {
            self.expired.remove(&id);
        } else {
            self.expired.insert(id, task.clone());
        }
        self.scheduled.insert(id, task);
        true
    }

    /// Place a freshly created task into whichever buckets it belongs to.
    pub fn insert_created(&mut self, task: Task, today: NaiveDate, window: &CalendarWindow) {
        if task.is_overdue(today) {
            self.expired.insert(task.id, task.clone());
        }
        if window.contains(task.planned_at) {
            self.scheduled.insert(task.id, task);
        }
    }

    /// Evict scheduled tasks that fell outside the visible grid.
    pub fn retain_window(&mut self, window: &CalendarWindow) {
        self.scheduled.retain(|_, t| window.contains(t.planned_at));
    }
}
