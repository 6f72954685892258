//! End-to-end tests of the calendar session over the HTTP gateway.
//!
//! A mockito server stands in for the task server; the session is driven
//! the way the watch loop drives it.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use daytick_core::events::CalendarEvent;
use daytick_core::gateway::HttpGateway;
use daytick_core::session::{CalendarSession, Clock};
use daytick_core::settings::WeekStart;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const TOKEN: &str = "9b8e7d6c-5a4b-4c3d-8e2f-1a0b9c8d7e6f";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn clock(s: &str) -> Clock {
    let now = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
    Arc::new(move || now)
}

fn task_json(id: u64, planned: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("task {id}"),
        "planned_at": planned,
        "created_at": "2024-01-01T08:00:00Z",
        "completed": completed,
    })
}

async fn seeded_server() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/me")
        .with_status(200)
        .with_body(r#"{"start_of_week":1,"rollover_time":"00:00"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("before".into(), "2024-02-15".into()),
            Matcher::UrlEncoded("completed".into(), "false".into()),
        ]))
        .with_status(200)
        .with_body(json!([task_json(1, "2024-02-10", false)]).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("after".into(), "2024-01-28".into()),
            Matcher::UrlEncoded("before".into(), "2024-03-04".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                task_json(1, "2024-02-10", false),
                task_json(2, "2024-02-20", false),
                task_json(3, "2024-02-05", true),
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
}

async fn started(server: &ServerGuard) -> CalendarSession<HttpGateway> {
    let gateway = HttpGateway::new(&server.url(), Some(TOKEN.to_string())).unwrap();
    let mut session = CalendarSession::with_clock(gateway, clock("2024-02-15 09:00"));
    session.start();
    session.settle().await;
    session
}

#[tokio::test]
async fn initial_load_fills_both_buckets() {
    let server = seeded_server().await;
    let session = started(&server).await;
    let model = session.model();

    assert_eq!(model.settings().start_of_week, WeekStart::MONDAY);
    assert_eq!(model.today(), date("2024-02-15"));
    assert_eq!(model.buckets().expired_len(), 1);
    assert_eq!(model.buckets().scheduled_len(), 3);
    assert!(model.last_error().is_none());
}

#[tokio::test]
async fn delete_stays_deleted_when_server_refuses() {
    let mut server = seeded_server().await;
    let delete = server
        .mock("DELETE", "/api/tasks/2")
        .with_status(500)
        .with_body(r#"{"error":"database is locked"}"#)
        .create_async()
        .await;
    let mut session = started(&server).await;

    session.dispatch(CalendarEvent::Delete { id: 2 });
    assert!(session.model().task(2).is_none());
    session.settle().await;

    delete.assert_async().await;
    assert!(session.model().task(2).is_none());
    assert_eq!(session.model().last_error(), Some("database is locked"));
}

#[tokio::test]
async fn move_into_the_past_sends_patch_and_expires_locally() {
    let mut server = seeded_server().await;
    let patch = server
        .mock("PATCH", "/api/tasks/2")
        .match_body(Matcher::Json(json!({"planned_at": "2024-02-12"})))
        .with_status(200)
        .with_body(task_json(2, "2024-02-12", false).to_string())
        .create_async()
        .await;
    let mut session = started(&server).await;

    session.dispatch(CalendarEvent::Move {
        id: 2,
        date: date("2024-02-12"),
    });
    assert!(session.model().buckets().is_expired(2));
    session.settle().await;

    patch.assert_async().await;
    assert!(session.model().last_error().is_none());
}

#[tokio::test]
async fn next_month_reloads_scheduled_for_new_grid() {
    let mut server = seeded_server().await;
    let march = server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("after".into(), "2024-02-25".into()),
            Matcher::UrlEncoded("before".into(), "2024-04-01".into()),
        ]))
        .with_status(200)
        .with_body(json!([task_json(7, "2024-03-08", false)]).to_string())
        .create_async()
        .await;
    let mut session = started(&server).await;

    session.dispatch(CalendarEvent::ShiftMonths { months: 1 });
    session.settle().await;

    march.assert_async().await;
    let model = session.model();
    assert_eq!(model.selected(), date("2024-03-15"));
    assert_eq!(model.buckets().scheduled_len(), 1);
    assert_eq!(model.buckets().expired_len(), 1);
}
