//! Calendar view-model state machine.
//!
//! Plain data plus one transition function: [`CalendarModel::apply`] takes a
//! [`CalendarEvent`], updates the local state synchronously and returns the
//! remote [`Effect`]s the caller should dispatch. Nothing here awaits the
//! network, so a failed effect can never roll back a visible change.
//!
//! ## Reload rules
//!
//! - `today` changed → `FetchExpired`
//! - grid bounds changed → `FetchScheduled`

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use super::buckets::TaskBuckets;
use super::today::TodayResolver;
use super::window::{shift_months, CalendarWindow};
use crate::events::{CalendarEvent, Effect};
use crate::settings::{LocaleSettings, WeekStart};
use crate::task::{Task, TaskId, TaskPatch};

#[derive(Debug, Clone)]
pub struct CalendarModel {
    settings: LocaleSettings,
    resolver: TodayResolver,
    today: NaiveDate,
    selected: NaiveDate,
    window: CalendarWindow,
    buckets: TaskBuckets,
    last_error: Option<String>,
}

impl CalendarModel {
    /// Model with default settings (Monday, midnight) until the real ones
    /// arrive; selection starts on today.
    pub fn new(now: NaiveDateTime) -> Self {
        Self::with_settings(LocaleSettings::default(), now)
    }

    pub fn with_settings(settings: LocaleSettings, now: NaiveDateTime) -> Self {
        let resolver = TodayResolver::new(settings.rollover_time);
        let today = resolver.today_at(now);
        Self {
            settings,
            resolver,
            today,
            selected: today,
            window: CalendarWindow::compute(today, settings.start_of_week),
            buckets: TaskBuckets::new(),
            last_error: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> LocaleSettings {
        self.settings
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn window(&self) -> &CalendarWindow {
        &self.window
    }

    pub fn buckets(&self) -> &TaskBuckets {
        &self.buckets
    }

    /// Task shown in either bucket, if any.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.buckets.get(id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Effects that bring a fresh model up to date.
    pub fn start(&self) -> Vec<Effect> {
        vec![
            Effect::FetchSettings,
            self.expired_fetch(),
            self.scheduled_fetch(),
        ]
    }

    /// Effects that reload both buckets for the current state.
    pub fn reload(&self) -> Vec<Effect> {
        vec![self.expired_fetch(), self.scheduled_fetch()]
    }

    // ── Transition ───────────────────────────────────────────────────

    pub fn apply(&mut self, event: CalendarEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            CalendarEvent::SettingsLoaded { settings, now } => {
                debug!(
                    start_of_week = settings.start_of_week.iso(),
                    rollover = %settings.rollover_time,
                    "locale settings loaded"
                );
                self.settings = settings;
                self.resolver = TodayResolver::new(settings.rollover_time);
                self.refresh_today(now, &mut effects);
                self.recompute_window(&mut effects);
            }
            CalendarEvent::Tick { now } => self.refresh_today(now, &mut effects),
            CalendarEvent::Select { date } => self.set_selected(date, &mut effects),
            CalendarEvent::ShiftMonths { months } => {
                let date = shift_months(self.selected, months);
                self.set_selected(date, &mut effects);
            }
            CalendarEvent::GoToToday => self.set_selected(self.today, &mut effects),
            CalendarEvent::Delete { id } => {
                let removed = self.buckets.delete(id);
                debug!(id, removed, "task deleted locally");
                effects.push(Effect::DeleteTask { id });
            }
            CalendarEvent::ToggleComplete { id, completed } => {
                self.buckets.toggle_complete(id, completed, self.today);
                debug!(id, completed, "task completion toggled locally");
                effects.push(Effect::UpdateTask {
                    id,
                    patch: TaskPatch::completed(completed),
                });
            }
            CalendarEvent::Move { id, date } => {
                let known = self.buckets.move_task(id, date, self.today);
                if !self.window.contains(date) {
                    self.buckets.retain_window(&self.window);
                }
                debug!(id, %date, known, "task moved locally");
                effects.push(Effect::UpdateTask {
                    id,
                    patch: TaskPatch::planned_at(date),
                });
            }
            CalendarEvent::Created { task } => {
                debug!(id = task.id, "created task placed");
                self.buckets.insert_created(task, self.today, &self.window);
            }
            CalendarEvent::ExpiredLoaded { tasks } => {
                debug!(count = tasks.len(), "expired bucket replaced");
                self.buckets.load_expired(tasks);
            }
            CalendarEvent::ScheduledLoaded { tasks } => {
                debug!(count = tasks.len(), "scheduled bucket replaced");
                self.buckets.load_scheduled(tasks);
            }
            CalendarEvent::RemoteFailed { message } => {
                warn!(%message, "remote call failed; local state kept");
                self.last_error = Some(message);
            }
        }
        effects
    }

    // ── Internals ────────────────────────────────────────────────────

    fn refresh_today(&mut self, now: NaiveDateTime, effects: &mut Vec<Effect>) {
        let update = self
            .resolver
            .advance(now, Some(self.today), Some(self.selected));
        if update.today_changed {
            debug!(from = %self.today, to = %update.today, "today rolled over");
            self.today = update.today;
            effects.push(self.expired_fetch());
        }
        if update.selected != self.selected {
            self.set_selected(update.selected, effects);
        }
    }

    fn set_selected(&mut self, date: NaiveDate, effects: &mut Vec<Effect>) {
        self.selected = date;
        self.recompute_window(effects);
    }

    fn recompute_window(&mut self, effects: &mut Vec<Effect>) {
        let week_start: WeekStart = self.settings.start_of_week;
        let next = CalendarWindow::compute(self.selected, week_start);
        let reload = next.query_bounds() != self.window.query_bounds();
        self.window = next;
        if reload {
            effects.push(self.scheduled_fetch());
        }
    }

    fn expired_fetch(&self) -> Effect {
        Effect::FetchExpired { before: self.today }
    }

    fn scheduled_fetch(&self) -> Effect {
        let (after, before) = self.window.query_bounds();
        Effect::FetchScheduled { after, before }
    }
}
