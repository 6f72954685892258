//! Network boundary to the task server.
//!
//! The calendar model never calls this directly; the session dispatches the
//! model's effects here and feeds the outcome back as events.

use std::future::Future;

use crate::error::GatewayError;
use crate::settings::{LocaleSettings, LocaleSettingsPatch};
use crate::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskQuery};

pub mod http;


pub use http::HttpGateway;

/// Every read and write the client can ask of the server.
///
/// Implementations are cheap to clone so that each request can run on its
/// own spawned task.
pub trait TaskGateway: Clone + Send + Sync + 'static {
    /// `GET /api/me`
    fn fetch_settings(&self) -> impl Future<Output = Result<LocaleSettings, GatewayError>> + Send;

    /// `PATCH /api/me`
    fn update_settings(
        &self,
        patch: &LocaleSettingsPatch,
    ) -> impl Future<Output = Result<LocaleSettings, GatewayError>> + Send;

    /// `GET /api/tasks`
    fn list_tasks(
        &self,
        query: &TaskQuery,
    ) -> impl Future<Output = Result<Vec<Task>, GatewayError>> + Send;

    /// `GET /api/tasks/count`
    fn count_tasks(
        &self,
        filter: &TaskFilter,
    ) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// `GET /api/tasks/:id`
    fn get_task(&self, id: TaskId) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// `POST /api/tasks`
    fn create_task(
        &self,
        task: &NewTask,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// `PATCH /api/tasks/:id`
    fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// `DELETE /api/tasks/:id`
    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
