use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rollcall_api::services::dispatcher::{DispatchReport, NotificationDispatcher, CHECKIN_LINK};
use rollcall_core::errors::AttendanceError;
use rollcall_core::models::notification::ATTENDANCE_OPEN;
use rollcall_mailer::{DeliveryError, LogMailer, Mailer, MockMailer, OutgoingMessage};

use crate::test_utils::{chicago_wednesday, TestContext};

struct StalledMailer;

#[async_trait]
impl Mailer for StalledMailer {
    async fn send(&self, _message: OutgoingMessage) -> Result<(), DeliveryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_three_distinct_leaders_get_one_notification_each() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    tc.store.add_group(tc.org, "Beta", &["ben", "cy"]);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let report = tc
        .dispatcher(Arc::new(LogMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    assert_eq!(report.notified, 3);
    let notifications = tc.store.notifications();
    let mut recipients: Vec<_> = notifications.iter().map(|n| n.recipient.as_str()).collect();
    recipients.sort();
    assert_eq!(recipients, vec!["ana", "ben", "cy"]);
    assert!(notifications.iter().all(|n| n.kind == ATTENDANCE_OPEN));
    assert!(notifications.iter().all(|n| n.action_link == CHECKIN_LINK));
    assert!(notifications.iter().all(|n| n.organization_id == tc.org));
}

#[tokio::test]
async fn test_inactive_group_leaders_are_not_notified() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana"]);
    tc.store.add_inactive_group(tc.org, "Retired", &["old"]);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    tc.dispatcher(Arc::new(LogMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    let notifications = tc.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient, "ana");
}

#[tokio::test]
async fn test_emails_only_leaders_with_an_address() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    tc.store.add_contact(tc.org, "ana", Some("Ana"), Some("ana@example.com"));
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .withf(|m| {
            m.to == "ana@example.com"
                && m.to_name.as_deref() == Some("Ana")
                && m.html.contains("https://rollcall.test/attendance/checkin")
        })
        .times(1)
        .returning(|_| Ok(()));

    let report = tc
        .dispatcher(Arc::new(mailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    assert_eq!(
        report,
        DispatchReport {
            notified: 2,
            notify_failed: 0,
            emailed: 1,
            email_failed: 0,
        }
    );
}

#[tokio::test]
async fn test_failed_send_is_counted_not_raised() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    tc.store.add_contact(tc.org, "ana", None, Some("ana@example.com"));
    tc.store.add_contact(tc.org, "ben", None, Some("ben@example.com"));
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let mut mailer = MockMailer::new();
    mailer.expect_send().times(2).returning(|m| {
        if m.to.starts_with("ana") {
            Err(DeliveryError::InvalidMessage("bounced".to_string()))
        } else {
            Ok(())
        }
    });

    let report = tc
        .dispatcher(Arc::new(mailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    assert_eq!(report.notified, 2);
    assert_eq!(report.emailed, 1);
    assert_eq!(report.email_failed, 1);
}

#[tokio::test]
async fn test_stalled_delivery_times_out() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana"]);
    tc.store.add_contact(tc.org, "ana", None, Some("ana@example.com"));
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let report = tc
        .dispatcher(Arc::new(StalledMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    assert_eq!(report.notified, 1);
    assert_eq!(report.email_failed, 1);
}

#[tokio::test]
async fn test_no_leaders_no_notifications() {
    let tc = TestContext::new();
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let report = tc
        .dispatcher(Arc::new(LogMailer))
        .dispatch_event_opened(&event)
        .await
        .unwrap();

    assert_eq!(report, DispatchReport::default());
    assert!(tc.store.notifications().is_empty());
}

fn quick_dispatcher(tc: &TestContext) -> NotificationDispatcher {
    NotificationDispatcher::new(
        tc.store.clone(),
        Arc::new(LogMailer),
        "https://rollcall.test",
        Duration::from_millis(100),
        Duration::from_millis(100),
    )
}

#[tokio::test]
async fn test_hung_leader_lookup_times_out() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana"]);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;
    tc.store.stall_leader_lookup();

    let result = quick_dispatcher(&tc).dispatch_event_opened(&event).await;

    assert!(matches!(result, Err(AttendanceError::Database(_))));
}

#[tokio::test]
async fn test_hung_notification_insert_is_counted_as_failed() {
    let tc = TestContext::new();
    tc.store.add_group(tc.org, "Alpha", &["ana", "ben"]);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;
    tc.store.stall_notifications();

    let report = quick_dispatcher(&tc).dispatch_event_opened(&event).await.unwrap();

    assert_eq!(
        report,
        DispatchReport {
            notified: 0,
            notify_failed: 2,
            emailed: 0,
            email_failed: 0,
        }
    );
    assert!(tc.store.notifications().is_empty());
}
