use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rollcall_api::services::{
    events::open_event,
    notifications::{list_notifications, mark_read},
    schedules::{create_schedule, list_schedules, update_schedule},
};
use rollcall_core::{
    errors::AttendanceError,
    models::{
        event::OpenEventRequest,
        schedule::{CreateScheduleRequest, UpdateScheduleRequest},
    },
};
use rollcall_db::store::AttendanceStore;
use rollcall_mailer::LogMailer;
use uuid::Uuid;

use crate::test_utils::{chicago_wednesday, wednesday, TestContext};

fn wednesday_evening() -> CreateScheduleRequest {
    CreateScheduleRequest {
        weekday: 3,
        start_time_local: "19:00".to_string(),
        timezone: "America/Chicago".to_string(),
        active: true,
    }
}

#[tokio::test]
async fn test_admin_creates_and_lists_schedules() {
    let tc = TestContext::new();
    let ctx = tc.ctx();

    let created = create_schedule(&ctx, &tc.admin(), wednesday_evening()).await.unwrap();
    let listed = list_schedules(&ctx, &tc.admin()).await.unwrap();

    assert_eq!(created.organization_id, tc.org);
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_leader_cannot_manage_schedules() {
    let tc = TestContext::new();

    let result = create_schedule(&tc.ctx(), &tc.leader("gail"), wednesday_evening()).await;

    assert!(matches!(result, Err(AttendanceError::Authorization(_))));
}

#[tokio::test]
async fn test_invalid_schedule_is_rejected_before_writing() {
    let tc = TestContext::new();
    let request = CreateScheduleRequest {
        start_time_local: "7:00 pm".to_string(),
        ..wednesday_evening()
    };

    let result = create_schedule(&tc.ctx(), &tc.admin(), request).await;

    assert!(matches!(result, Err(AttendanceError::Validation(_))));
    assert!(tc.store.list_schedules(tc.org).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deactivate_schedule() {
    let tc = TestContext::new();
    let ctx = tc.ctx();
    let created = create_schedule(&ctx, &tc.admin(), wednesday_evening()).await.unwrap();

    let updated = update_schedule(
        &ctx,
        &tc.admin(),
        created.id,
        UpdateScheduleRequest {
            active: Some(false),
            ..UpdateScheduleRequest::default()
        },
    )
    .await
    .unwrap();

    assert!(!updated.active);
    assert_eq!(updated.start_time_local, "19:00");
    assert!(tc.store.list_active_schedules().await.unwrap().is_empty());
    assert_eq!(list_schedules(&ctx, &tc.admin()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_unknown_schedule_is_not_found() {
    let tc = TestContext::new();

    let result = update_schedule(
        &tc.ctx(),
        &tc.admin(),
        Uuid::new_v4(),
        UpdateScheduleRequest::default(),
    )
    .await;

    assert!(matches!(result, Err(AttendanceError::NotFound(_))));
}

#[tokio::test]
async fn test_manual_event_notifies_leaders() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    let dispatcher = tc.dispatcher(Arc::new(LogMailer));

    let event = open_event(
        &tc.ctx(),
        &dispatcher,
        &tc.admin(),
        OpenEventRequest {
            event_date_local: wednesday(),
            start_time_local: Some("19:00".to_string()),
            timezone: "America/Chicago".to_string(),
        },
        chicago_wednesday(18, 45),
    )
    .await
    .unwrap();

    assert_eq!(event.schedule_id, None);
    assert!(!event.created_by_system);
    assert_eq!(event.starts_at, Utc.with_ymd_and_hms(2024, 10, 17, 0, 0, 0).unwrap());
    assert_eq!(tc.store.notifications().len(), 2);
}

#[tokio::test]
async fn test_manual_event_without_start_time_starts_now() {
    let tc = TestContext::new();
    let now = chicago_wednesday(18, 45);

    let event = open_event(
        &tc.ctx(),
        &tc.dispatcher(Arc::new(LogMailer)),
        &tc.admin(),
        OpenEventRequest {
            event_date_local: wednesday(),
            start_time_local: None,
            timezone: "America/Chicago".to_string(),
        },
        now,
    )
    .await
    .unwrap();

    assert_eq!(event.starts_at, now);
}

#[tokio::test]
async fn test_manual_event_requires_admin() {
    let tc = TestContext::new();

    let result = open_event(
        &tc.ctx(),
        &tc.dispatcher(Arc::new(LogMailer)),
        &tc.leader("gail"),
        OpenEventRequest {
            event_date_local: wednesday(),
            start_time_local: None,
            timezone: "America/Chicago".to_string(),
        },
        chicago_wednesday(18, 45),
    )
    .await;

    assert!(matches!(result, Err(AttendanceError::Authorization(_))));
    assert!(tc.store.events().is_empty());
}

#[tokio::test]
async fn test_notification_inbox() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;
    tc.dispatcher(Arc::new(LogMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();
    let ctx = tc.ctx();
    let ana = tc.leader("ana");

    let inbox = list_notifications(&ctx, &ana).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].read_at, None);

    let first = chicago_wednesday(19, 30);
    let read = mark_read(&ctx, &ana, inbox[0].id, first).await.unwrap();
    let again = mark_read(&ctx, &ana, inbox[0].id, first + Duration::hours(2)).await.unwrap();
    assert_eq!(read.read_at, Some(first));
    assert_eq!(again.read_at, Some(first));

    let not_mine = mark_read(&ctx, &tc.leader("ben"), inbox[0].id, first).await;
    assert!(matches!(not_mine, Err(AttendanceError::NotFound(_))));
}
