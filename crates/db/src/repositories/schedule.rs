use crate::models::DbSchedule;
use chrono::Utc;
use eyre::Result;
use rollcall_core::models::schedule::ScheduleFields;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_schedule(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    fields: &ScheduleFields,
) -> Result<DbSchedule> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating attendance schedule: id={}, organization_id={}, weekday={}, start={}, timezone={}",
        id, organization_id, fields.weekday, fields.start_time_local, fields.timezone
    );

    let schedule = sqlx::query_as::<_, DbSchedule>(
        r#"
        INSERT INTO attendance_schedules
            (id, organization_id, weekday, start_time_local, timezone, active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING id, organization_id, weekday, start_time_local, timezone, active, created_at
        "#,
    )
    .bind(id)
    .bind(organization_id)
    .bind(i16::from(fields.weekday))
    .bind(&fields.start_time_local)
    .bind(&fields.timezone)
    .bind(fields.active)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(schedule)
}

pub async fn get_schedule_by_id(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    id: Uuid,
) -> Result<Option<DbSchedule>> {
    let schedule = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, organization_id, weekday, start_time_local, timezone, active, created_at
        FROM attendance_schedules
        WHERE id = $1 AND organization_id = $2
        "#,
    )
    .bind(id)
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

pub async fn get_schedules_by_organization(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
) -> Result<Vec<DbSchedule>> {
    let schedules = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, organization_id, weekday, start_time_local, timezone, active, created_at
        FROM attendance_schedules
        WHERE organization_id = $1
        ORDER BY weekday ASC, start_time_local ASC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

pub async fn get_active_schedules(pool: &Pool<Postgres>) -> Result<Vec<DbSchedule>> {
    let schedules = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, organization_id, weekday, start_time_local, timezone, active, created_at
        FROM attendance_schedules
        WHERE active = TRUE
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

pub async fn update_schedule(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    id: Uuid,
    fields: &ScheduleFields,
) -> Result<Option<DbSchedule>> {
    let schedule = sqlx::query_as::<_, DbSchedule>(
        r#"
        UPDATE attendance_schedules
        SET weekday = $3, start_time_local = $4, timezone = $5, active = $6, updated_at = NOW()
        WHERE id = $1 AND organization_id = $2
        RETURNING id, organization_id, weekday, start_time_local, timezone, active, created_at
        "#,
    )
    .bind(id)
    .bind(organization_id)
    .bind(i16::from(fields.weekday))
    .bind(&fields.start_time_local)
    .bind(&fields.timezone)
    .bind(fields.active)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}
