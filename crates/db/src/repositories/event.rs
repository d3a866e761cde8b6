use crate::models::DbEvent;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use rollcall_core::models::event::{EventStatus, NewEvent};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, organization_id, schedule_id, event_date_local, starts_at, status, opened_at, created_by_system";

/// Inserts an open event. Returns `None` when an event for the same schedule
/// and local date already exists.
pub async fn insert_event(pool: &Pool<Postgres>, event: &NewEvent) -> Result<Option<DbEvent>> {
    let id = Uuid::new_v4();

    let query = format!(
        r#"
        INSERT INTO attendance_events
            (id, organization_id, schedule_id, event_date_local, starts_at, status, opened_at, created_by_system)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT ON CONSTRAINT attendance_events_schedule_date_key DO NOTHING
        RETURNING {EVENT_COLUMNS}
        "#
    );

    let inserted = sqlx::query_as::<_, DbEvent>(&query)
        .bind(id)
        .bind(event.organization_id)
        .bind(event.schedule_id)
        .bind(event.event_date_local)
        .bind(event.starts_at)
        .bind(EventStatus::Open.as_str())
        .bind(event.opened_at)
        .bind(event.created_by_system)
        .fetch_optional(pool)
        .await?;

    if inserted.is_none() {
        tracing::debug!(
            "Event already exists: schedule_id={:?}, date={}",
            event.schedule_id, event.event_date_local
        );
    }

    Ok(inserted)
}

pub async fn get_event_by_schedule_and_date(
    pool: &Pool<Postgres>,
    schedule_id: Uuid,
    event_date_local: NaiveDate,
) -> Result<Option<DbEvent>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM attendance_events WHERE schedule_id = $1 AND event_date_local = $2"
    );

    let event = sqlx::query_as::<_, DbEvent>(&query)
        .bind(schedule_id)
        .bind(event_date_local)
        .fetch_optional(pool)
        .await?;

    Ok(event)
}

pub async fn get_event_by_id(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    id: Uuid,
) -> Result<Option<DbEvent>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM attendance_events WHERE id = $1 AND organization_id = $2"
    );

    let event = sqlx::query_as::<_, DbEvent>(&query)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(pool)
        .await?;

    Ok(event)
}

pub async fn get_latest_open_event(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
) -> Result<Option<DbEvent>> {
    let query = format!(
        r#"
        SELECT {EVENT_COLUMNS}
        FROM attendance_events
        WHERE organization_id = $1 AND status = $2
        ORDER BY opened_at DESC
        LIMIT 1
        "#
    );

    let event = sqlx::query_as::<_, DbEvent>(&query)
        .bind(organization_id)
        .bind(EventStatus::Open.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(event)
}

pub async fn get_latest_event_since(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Option<DbEvent>> {
    let query = format!(
        r#"
        SELECT {EVENT_COLUMNS}
        FROM attendance_events
        WHERE organization_id = $1 AND opened_at >= $2
        ORDER BY opened_at DESC
        LIMIT 1
        "#
    );

    let event = sqlx::query_as::<_, DbEvent>(&query)
        .bind(organization_id)
        .bind(since)
        .fetch_optional(pool)
        .await?;

    Ok(event)
}
