use crate::models::DbNotification;
use chrono::{DateTime, Utc};
use eyre::Result;
use rollcall_core::models::notification::NewNotification;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_notification(
    pool: &Pool<Postgres>,
    notification: &NewNotification,
) -> Result<DbNotification> {
    let id = Uuid::new_v4();

    let notification = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications
            (id, organization_id, recipient, kind, title, body, action_link, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, organization_id, recipient, kind, title, body, action_link, created_at, read_at
        "#,
    )
    .bind(id)
    .bind(notification.organization_id)
    .bind(&notification.recipient)
    .bind(&notification.kind)
    .bind(&notification.title)
    .bind(&notification.body)
    .bind(&notification.action_link)
    .bind(notification.created_at)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn get_notifications_for_recipient(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    recipient: &str,
) -> Result<Vec<DbNotification>> {
    let notifications = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, organization_id, recipient, kind, title, body, action_link, created_at, read_at
        FROM notifications
        WHERE organization_id = $1 AND recipient = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(organization_id)
    .bind(recipient)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// Sets `read_at` unless it is already set.
pub async fn mark_notification_read(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    recipient: &str,
    id: Uuid,
    read_at: DateTime<Utc>,
) -> Result<Option<DbNotification>> {
    let notification = sqlx::query_as::<_, DbNotification>(
        r#"
        UPDATE notifications
        SET read_at = COALESCE(read_at, $4)
        WHERE id = $1 AND organization_id = $2 AND recipient = $3
        RETURNING id, organization_id, recipient, kind, title, body, action_link, created_at, read_at
        "#,
    )
    .bind(id)
    .bind(organization_id)
    .bind(recipient)
    .bind(read_at)
    .fetch_optional(pool)
    .await?;

    Ok(notification)
}
