use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rollcall_api::services::{
    dispatcher::NotificationDispatcher,
    opener::{opening_due, Due, EventOpener, OpenerSummary},
};
use rollcall_core::models::{notification::ATTENDANCE_OPEN, schedule::ScheduleFields};
use rollcall_db::store::AttendanceStore;
use rollcall_mailer::{DeliveryError, LogMailer, MockMailer};
use rstest::rstest;

use crate::test_utils::{chicago_wednesday, wednesday, TestContext};

#[tokio::test]
async fn test_opens_one_event_shortly_after_start() {
    let tc = TestContext::new();
    let schedule = tc.add_schedule(3, "19:00", "America/Chicago").await;

    let summary = tc.opener().run(chicago_wednesday(19, 5)).await.unwrap();

    assert_eq!(
        summary,
        OpenerSummary {
            evaluated: 1,
            opened: 1,
            already_open: 0,
            not_due: 0,
            failed: 0,
        }
    );
    let events = tc.store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].schedule_id, Some(schedule.id));
    assert_eq!(events[0].event_date_local, wednesday());
    assert_eq!(events[0].starts_at, Utc.with_ymd_and_hms(2024, 10, 17, 0, 0, 0).unwrap());
    assert_eq!(events[0].opened_at, chicago_wednesday(19, 5));
    assert!(events[0].created_by_system);
}

#[tokio::test]
async fn test_second_pass_same_day_is_a_no_op() {
    let tc = TestContext::new();
    tc.add_schedule(3, "19:00", "America/Chicago").await;
    let opener = tc.opener();

    opener.run(chicago_wednesday(19, 5)).await.unwrap();
    let summary = opener.run(chicago_wednesday(19, 40)).await.unwrap();

    assert_eq!(summary.opened, 0);
    assert_eq!(summary.already_open, 1);
    assert_eq!(tc.store.events().len(), 1);
}

#[tokio::test]
async fn test_too_late_does_not_open() {
    let tc = TestContext::new();
    tc.add_schedule(3, "19:00", "America/Chicago").await;

    let summary = tc.opener().run(chicago_wednesday(20, 15)).await.unwrap();

    assert_eq!(summary.not_due, 1);
    assert!(tc.store.events().is_empty());
}

#[tokio::test]
async fn test_overlapping_passes_open_once() {
    let tc = TestContext::new();
    tc.add_schedule(3, "19:00", "America/Chicago").await;
    let opener = tc.opener();
    let now = chicago_wednesday(19, 5);

    let (first, second) = tokio::join!(opener.run(now), opener.run(now));
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.opened + second.opened, 1);
    assert_eq!(first.already_open + second.already_open, 1);
    assert_eq!(tc.store.events().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_failing_schedule_does_not_stop_others() {
    let tc = TestContext::new();
    let broken = tc.add_schedule(3, "19:00", "America/Chicago").await;
    tc.add_schedule(3, "18:30", "America/Chicago").await;
    tc.store.fail_schedule(broken.id);

    let summary = tc.opener().run(chicago_wednesday(19, 5)).await.unwrap();

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.opened, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_inactive_schedules_are_skipped() {
    let tc = TestContext::new();
    let schedule = tc.add_schedule(3, "19:00", "America/Chicago").await;
    let inactive = ScheduleFields::validate(3, "19:00", "America/Chicago", false).unwrap();
    tc.store.update_schedule(tc.org, schedule.id, &inactive).await.unwrap();

    let summary = tc.opener().run(chicago_wednesday(19, 5)).await.unwrap();

    assert_eq!(summary.evaluated, 0);
    assert!(tc.store.events().is_empty());
}

#[tokio::test]
async fn test_opening_notifies_leaders() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    tc.add_schedule(3, "19:00", "America/Chicago").await;

    tc.opener().run(chicago_wednesday(19, 5)).await.unwrap();

    let notifications = tc.store.notifications();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| n.kind == ATTENDANCE_OPEN));
}

#[test_log::test(tokio::test)]
async fn test_delivery_failure_keeps_event() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana"]);
    tc.store.add_contact(tc.org, "ana", Some("Ana"), Some("ana@example.com"));
    tc.add_schedule(3, "19:00", "America/Chicago").await;

    let mut mailer = MockMailer::new();
    mailer.expect_send().times(1).returning(|_| {
        Err(DeliveryError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    });

    let summary = tc.opener_with(Arc::new(mailer)).run(chicago_wednesday(19, 5)).await.unwrap();

    assert_eq!(summary.opened, 1);
    assert_eq!(tc.store.events().len(), 1);
    assert_eq!(tc.store.notifications().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_hung_leader_lookup_does_not_stall_the_pass() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana"]);
    tc.add_schedule(3, "19:00", "America/Chicago").await;
    tc.store.stall_leader_lookup();

    let store_timeout = Duration::from_millis(200);
    let dispatcher = NotificationDispatcher::new(
        tc.store.clone(),
        Arc::new(LogMailer),
        "https://rollcall.test",
        store_timeout,
        store_timeout,
    );
    let opener = EventOpener::new(tc.store.clone(), dispatcher, store_timeout);

    let summary = tokio::time::timeout(Duration::from_secs(3), opener.run(chicago_wednesday(19, 5)))
        .await
        .expect("opener pass should finish")
        .unwrap();

    assert_eq!(summary.opened, 1);
    assert_eq!(tc.store.events().len(), 1);
    assert!(tc.store.notifications().is_empty());
}

#[rstest]
#[case(19, 0, true)]
#[case(20, 10, true)]
#[case(18, 59, false)]
#[case(20, 11, false)]
#[tokio::test]
async fn test_tolerance_window(#[case] hour: u32, #[case] minute: u32, #[case] due: bool) {
    let tc = TestContext::new();
    let schedule = tc.add_schedule(3, "19:00", "America/Chicago").await;

    let result = opening_due(&schedule, chicago_wednesday(hour, minute)).unwrap();

    assert_eq!(matches!(result, Due::Yes { .. }), due);
}

#[tokio::test]
async fn test_other_weekday_is_not_due() {
    let tc = TestContext::new();
    let schedule = tc.add_schedule(4, "19:00", "America/Chicago").await;

    assert_eq!(opening_due(&schedule, chicago_wednesday(19, 5)).unwrap(), Due::No);
}

#[tokio::test]
async fn test_weekday_is_evaluated_in_schedule_timezone() {
    let tc = TestContext::new();
    // Wednesday 19:05 in Chicago is already Thursday 00:05 UTC
    let schedule = tc.add_schedule(4, "00:00", "UTC").await;

    let result = opening_due(&schedule, chicago_wednesday(19, 5)).unwrap();

    assert_eq!(
        result,
        Due::Yes {
            event_date_local: chrono::NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(),
            starts_at: Utc.with_ymd_and_hms(2024, 10, 17, 0, 0, 0).unwrap(),
        }
    );
}
