//! # Notification Dispatcher
//!
//! Fans an "attendance open" signal out to every leader of an active group.
//! The in-app notification row is the durable signal. E-mail is best effort
//! and nothing is retried. Every storage call and every send is bounded by a
//! timeout; per-recipient failures are logged and counted.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use eyre::eyre;
use futures::future::join_all;
use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::{
        event::AttendanceEvent,
        group::GroupLeader,
        notification::{NewNotification, ATTENDANCE_OPEN},
    },
};
use rollcall_db::store::AttendanceStore;
use rollcall_mailer::{Mailer, OutgoingMessage};
use tracing::{info, warn};

pub const CHECKIN_LINK: &str = "/attendance/checkin";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub notified: usize,
    pub notify_failed: usize,
    pub emailed: usize,
    pub email_failed: usize,
}

pub struct NotificationDispatcher {
    store: Arc<dyn AttendanceStore>,
    mailer: Arc<dyn Mailer>,
    app_base_url: String,
    store_timeout: Duration,
    delivery_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        mailer: Arc<dyn Mailer>,
        app_base_url: impl Into<String>,
        store_timeout: Duration,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            store,
            mailer,
            app_base_url: app_base_url.into(),
            store_timeout,
            delivery_timeout,
        }
    }

    /// Notifies the leaders of the event's organization that check-in is open.
    ///
    /// Only listing the leaders can fail, including by timing out;
    /// per-recipient problems end up in the returned report.
    pub async fn dispatch_event_opened(&self, event: &AttendanceEvent) -> AttendanceResult<DispatchReport> {
        let listed = tokio::time::timeout(
            self.store_timeout,
            self.store.list_active_group_leaders(event.organization_id),
        )
        .await
        .map_err(|_| {
            AttendanceError::Database(eyre!(
                "listing leaders for event {} timed out after {:?}",
                event.id,
                self.store_timeout
            ))
        })??;

        let mut seen = HashSet::new();
        let leaders: Vec<GroupLeader> = listed
            .into_iter()
            .filter(|leader| seen.insert(leader.identity.clone()))
            .collect();

        let mut report = DispatchReport::default();
        let title = "Attendance is open".to_string();
        let body = format!(
            "Check-in for {} is open. Mark who is here.",
            event.event_date_local.format("%A, %B %-d")
        );

        for leader in &leaders {
            let notification = NewNotification {
                organization_id: event.organization_id,
                recipient: leader.identity.clone(),
                kind: ATTENDANCE_OPEN.to_string(),
                title: title.clone(),
                body: body.clone(),
                action_link: CHECKIN_LINK.to_string(),
                created_at: Utc::now(),
            };
            let inserted =
                tokio::time::timeout(self.store_timeout, self.store.insert_notification(&notification)).await;
            match inserted {
                Ok(Ok(_)) => report.notified += 1,
                Ok(Err(e)) => {
                    warn!("Failed to notify {} of event {}: {}", leader.identity, event.id, e);
                    report.notify_failed += 1;
                }
                Err(_) => {
                    warn!(
                        "Notifying {} of event {} timed out after {:?}",
                        leader.identity, event.id, self.store_timeout
                    );
                    report.notify_failed += 1;
                }
            }
        }

        let sends = leaders
            .iter()
            .filter_map(|leader| leader.email.as_ref().map(|email| (leader, email)))
            .map(|(leader, email)| self.send_email(leader, email, &title, &body));

        for delivered in join_all(sends).await {
            if delivered {
                report.emailed += 1;
            } else {
                report.email_failed += 1;
            }
        }

        info!(
            "Event {} dispatched: {} notified, {} e-mailed, {} e-mail failures",
            event.id, report.notified, report.emailed, report.email_failed
        );
        Ok(report)
    }

    async fn send_email(&self, leader: &GroupLeader, email: &str, subject: &str, body: &str) -> bool {
        let link = format!("{}{}", self.app_base_url, CHECKIN_LINK);
        let message = OutgoingMessage {
            to: email.to_string(),
            to_name: leader.name.clone(),
            subject: subject.to_string(),
            html: format!("<p>{}</p><p><a href=\"{}\">Open check-in</a></p>", body, link),
        };

        match tokio::time::timeout(self.delivery_timeout, self.mailer.send(message)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("E-mail to {} failed: {}", leader.identity, e);
                false
            }
            Err(_) => {
                warn!(
                    "E-mail to {} timed out after {:?}",
                    leader.identity, self.delivery_timeout
                );
                false
            }
        }
    }
}
