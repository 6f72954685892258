//! Calendar session: the imperative shell around [`CalendarModel`].
//!
//! The session owns the model and a gateway. Every event is applied to the
//! model synchronously; the effects it returns are spawned as independent
//! tokio tasks whose outcome comes back later as another event. Nothing
//! waits for a mutation to be confirmed, failures only set the model's
//! error message, and overlapping responses are applied in arrival order.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::calendar::{spawn_ticker_with_clock, CalendarModel, TickerHandle};
use crate::error::GatewayError;
use crate::events::{CalendarEvent, Effect};
use crate::gateway::TaskGateway;
use crate::task::{NewTask, Task, TaskFilter, TaskQuery};

/// Wall-clock source shared with spawned requests and the ticker.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall clock.
pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Outcome of one spawned effect.
type Response = Option<CalendarEvent>;

pub struct CalendarSession<G: TaskGateway> {
    model: CalendarModel,
    gateway: G,
    clock: Clock,
    events_tx: UnboundedSender<CalendarEvent>,
    events_rx: UnboundedReceiver<CalendarEvent>,
    responses_tx: UnboundedSender<Response>,
    responses_rx: UnboundedReceiver<Response>,
    in_flight: usize,
    ticker: Option<TickerHandle>,
}

impl<G: TaskGateway> CalendarSession<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_clock(gateway, local_clock())
    }

    pub fn with_clock(gateway: G, clock: Clock) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Self {
            model: CalendarModel::new((*clock)()),
            gateway,
            clock,
            events_tx,
            events_rx,
            responses_tx,
            responses_rx,
            in_flight: 0,
            ticker: None,
        }
    }

    pub fn model(&self) -> &CalendarModel {
        &self.model
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Sender for user intents arriving from outside the session.
    pub fn sender(&self) -> UnboundedSender<CalendarEvent> {
        self.events_tx.clone()
    }

    /// Number of spawned requests whose response has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Kick off the initial settings and bucket loads.
    pub fn start(&mut self) {
        let effects = self.model.start();
        self.spawn_all(effects);
    }

    /// Re-read both buckets for the current window and today.
    pub fn reload(&mut self) {
        let effects = self.model.reload();
        self.spawn_all(effects);
    }

    /// Start recomputing today every `period`. Replaces a running ticker.
    pub fn start_ticker(&mut self, period: Duration) {
        let clock = Arc::clone(&self.clock);
        let handle = spawn_ticker_with_clock(period, self.events_tx.clone(), move || (*clock)());
        self.ticker = Some(handle);
    }

    pub fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.cancel();
        }
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Apply `event` locally and dispatch its effects without awaiting them.
    pub fn dispatch(&mut self, event: CalendarEvent) {
        let effects = self.model.apply(event);
        self.spawn_all(effects);
    }

    /// Forget the surfaced error once the view has shown it.
    pub fn clear_error(&mut self) {
        self.model.clear_error();
    }

    /// Wait for the next queued intent, tick or response and apply it.
    pub async fn process_next(&mut self) {
        tokio::select! {
            Some(response) = self.responses_rx.recv() => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if let Some(event) = response {
                    self.dispatch(event);
                }
            }
            Some(event) = self.events_rx.recv() => self.dispatch(event),
        }
    }

    /// Process events until every spawned request has been answered.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.process_next().await;
        }
    }

    /// Apply every intent already queued, then wait for the requests they
    /// started. Used on a clean shutdown so no mutation is left unsent.
    pub async fn drain(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
        }
        self.settle().await;
    }

    /// Create a task and place it once the server has assigned its id.
    ///
    /// Creation is the one mutation that has to wait for the server, since
    /// the buckets are keyed by server ids.
    pub async fn create_task(&mut self, task: NewTask) -> Result<Task, GatewayError> {
        match self.gateway.create_task(&task).await {
            Ok(created) => {
                self.dispatch(CalendarEvent::Created {
                    task: created.clone(),
                });
                Ok(created)
            }
            Err(e) => {
                self.dispatch(CalendarEvent::RemoteFailed {
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    fn spawn_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn_effect(effect);
        }
    }

    fn spawn_effect(&mut self, effect: Effect) {
        let gateway = self.gateway.clone();
        let clock = Arc::clone(&self.clock);
        let tx = self.responses_tx.clone();
        self.in_flight += 1;
        debug!(?effect, "dispatching effect");

        tokio::spawn(async move {
            let response = match run_effect(&gateway, &effect, &clock).await {
                Ok(event) => event,
                Err(e) => {
                    warn!(?effect, error = %e, "effect failed");
                    Some(CalendarEvent::RemoteFailed {
                        message: e.user_message(),
                    })
                }
            };
            // The session may be gone; its state no longer matters then.
            let _ = tx.send(response);
        });
    }
}

async fn run_effect<G: TaskGateway>(
    gateway: &G,
    effect: &Effect,
    clock: &Clock,
) -> Result<Option<CalendarEvent>, GatewayError> {
    match effect {
        Effect::FetchSettings => {
            let settings = gateway.fetch_settings().await?;
            Ok(Some(CalendarEvent::SettingsLoaded {
                settings,
                now: (**clock)(),
            }))
        }
        Effect::FetchExpired { before } => {
            let query = TaskQuery::from(TaskFilter::expired(*before));
            let tasks = gateway.list_tasks(&query).await?;
            Ok(Some(CalendarEvent::ExpiredLoaded { tasks }))
        }
        Effect::FetchScheduled { after, before } => {
            let query = TaskQuery::from(TaskFilter::between(*after, *before));
            let tasks = gateway.list_tasks(&query).await?;
            Ok(Some(CalendarEvent::ScheduledLoaded { tasks }))
        }
        Effect::DeleteTask { id } => {
            gateway.delete_task(*id).await?;
            Ok(None)
        }
        Effect::UpdateTask { id, patch } => {
            gateway.update_task(*id, patch).await?;
            Ok(None)
        }
    }
}
