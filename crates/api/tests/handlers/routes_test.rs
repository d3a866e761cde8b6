use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use pretty_assertions::assert_eq;
use rollcall_api::{app, services::opener::OpenerSummary};
use rollcall_core::models::{
    checkin::CheckinView,
    notification::Notification,
    record::SaveRecordsResponse,
    schedule::AttendanceSchedule,
};
use serde_json::{json, Value};

use crate::test_utils::TestContext;

fn server(tc: &TestContext, cron_secret: Option<&str>) -> TestServer {
    TestServer::new(app(tc.build_state(cron_secret))).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[tokio::test]
async fn test_health() {
    let tc = TestContext::new();

    let response = server(&tc, None).get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_checkin_requires_session() {
    let tc = TestContext::new();

    let response = server(&tc, None).get("/api/attendance/checkin").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Authentication error"));
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let tc = TestContext::new();

    let response = server(&tc, None)
        .get("/api/attendance/checkin")
        .add_header(header::AUTHORIZATION, bearer("nope"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkin_with_bearer_token() {
    let tc = TestContext::new();
    let g = tc.store.add_group(tc.org, "Guppies", &["gail"]);
    tc.store.add_person(tc.org, "Gina", Some(g.id));
    let event = tc.open_event(Utc::now()).await;
    tc.sign_in("gail-token", &tc.leader("gail"));

    let response = server(&tc, None)
        .get("/api/attendance/checkin")
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .await;

    response.assert_status_ok();
    let view: CheckinView = response.json();
    assert_eq!(view.event.map(|e| e.id), Some(event.id));
    assert_eq!(view.groups.len(), 1);
    assert_eq!(view.groups[0].entries[0].name, "Gina");
}

#[tokio::test]
async fn test_checkin_with_session_cookie() {
    let tc = TestContext::new();
    tc.sign_in("admin-token", &tc.admin());

    let response = server(&tc, None)
        .get("/api/attendance/checkin")
        .add_header(header::COOKIE, HeaderValue::from_static("st_session=admin-token"))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "event": null, "groups": [] }));
}

#[tokio::test]
async fn test_save_records_out_of_scope_is_forbidden() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Guppies", &["gail"]);
    let h = tc.store.add_group(tc.org, "Herons", &["hank"]);
    let hal = tc.store.add_person(tc.org, "Hal", Some(h.id));
    let event = tc.open_event(Utc::now()).await;
    tc.sign_in("gail-token", &tc.leader("gail"));

    let response = server(&tc, None)
        .post(&format!("/api/attendance/events/{}/records", event.id))
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .json(&json!({ "records": [{ "personId": hal.id, "present": true }] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_save_records() {
    let tc = TestContext::new();
    let g = tc.store.add_group(tc.org, "Guppies", &["gail"]);
    let gina = tc.store.add_person(tc.org, "Gina", Some(g.id));
    let event = tc.open_event(Utc::now()).await;
    tc.sign_in("gail-token", &tc.leader("gail"));

    let response = server(&tc, None)
        .post(&format!("/api/attendance/events/{}/records", event.id))
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .json(&json!({ "records": [{ "personId": gina.id, "present": true, "note": "hi" }] }))
        .await;

    response.assert_status_ok();
    let saved: SaveRecordsResponse = response.json();
    assert_eq!(saved.saved, 1);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let tc = TestContext::new();
    tc.sign_in("admin-token", &tc.admin());

    let response = server(&tc, None)
        .get(&format!("/api/attendance/events/{}/guests", uuid::Uuid::new_v4()))
        .add_header(header::AUTHORIZATION, bearer("admin-token"))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schedule_admin_round_trip() {
    let tc = TestContext::new();
    tc.sign_in("admin-token", &tc.admin());
    let server = server(&tc, None);

    let created = server
        .post("/api/attendance/schedules")
        .add_header(header::AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "weekday": 3, "startTimeLocal": "19:00", "timezone": "America/Chicago" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let schedule: AttendanceSchedule = created.json();

    let updated = server
        .put(&format!("/api/attendance/schedules/{}", schedule.id))
        .add_header(header::AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "active": false }))
        .await;
    updated.assert_status_ok();
    let schedule: AttendanceSchedule = updated.json();
    assert!(!schedule.active);
}

#[tokio::test]
async fn test_invalid_schedule_is_bad_request() {
    let tc = TestContext::new();
    tc.sign_in("admin-token", &tc.admin());

    let response = server(&tc, None)
        .post("/api/attendance/schedules")
        .add_header(header::AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "weekday": 7, "startTimeLocal": "19:00", "timezone": "America/Chicago" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leader_cannot_list_schedules() {
    let tc = TestContext::new();
    tc.sign_in("gail-token", &tc.leader("gail"));

    let response = server(&tc, None)
        .get("/api/attendance/schedules")
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cron_without_configured_secret() {
    let tc = TestContext::new();

    let response = server(&tc, None)
        .post("/api/cron/attendance")
        .add_header(header::AUTHORIZATION, bearer("anything"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cron_with_wrong_secret() {
    let tc = TestContext::new();

    let response = server(&tc, Some("s3cret"))
        .post("/api/cron/attendance")
        .add_header(header::AUTHORIZATION, bearer("wrong"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_runs_opener_pass() {
    let tc = TestContext::new();
    // Weekday and time chosen so the schedule is never due right now
    let now = Utc::now();
    let weekday = (chrono::Datelike::weekday(&now).num_days_from_sunday() + 1) % 7;
    tc.add_schedule(i64::from(weekday), "00:00", "UTC").await;

    let response = server(&tc, Some("s3cret"))
        .post("/api/cron/attendance")
        .add_header(header::AUTHORIZATION, bearer("s3cret"))
        .await;

    response.assert_status_ok();
    let summary: OpenerSummary = response.json();
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.not_due, 1);
    let body: Value = response.json();
    assert!(body.get("alreadyOpen").is_some());
}

#[tokio::test]
async fn test_notification_routes() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Guppies", &["gail"]);
    let event = tc.open_event(Utc::now()).await;
    tc.dispatcher(std::sync::Arc::new(rollcall_mailer::LogMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();
    tc.sign_in("gail-token", &tc.leader("gail"));
    let server = server(&tc, None);

    let inbox: Vec<Notification> = server
        .get("/api/notifications")
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .await
        .json();
    assert_eq!(inbox.len(), 1);

    let read = server
        .post(&format!("/api/notifications/{}/read", inbox[0].id))
        .add_header(header::AUTHORIZATION, bearer("gail-token"))
        .await;
    read.assert_status_ok();
    let read: Notification = read.json();
    assert!(read.read_at.is_some());
}
