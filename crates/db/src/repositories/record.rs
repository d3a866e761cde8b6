use crate::models::DbRecord;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Writes one mark, overwriting any previous mark for the same person.
pub async fn upsert_record(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    person_id: Uuid,
    present: bool,
    note: Option<&str>,
    marked_by: &str,
    marked_at: DateTime<Utc>,
) -> Result<DbRecord> {
    let record = sqlx::query_as::<_, DbRecord>(
        r#"
        INSERT INTO attendance_records (event_id, person_id, present, note, marked_by, marked_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (event_id, person_id)
        DO UPDATE SET
            present = EXCLUDED.present,
            note = EXCLUDED.note,
            marked_by = EXCLUDED.marked_by,
            marked_at = EXCLUDED.marked_at
        RETURNING event_id, person_id, present, note, marked_by, marked_at
        "#,
    )
    .bind(event_id)
    .bind(person_id)
    .bind(present)
    .bind(note)
    .bind(marked_by)
    .bind(marked_at)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn get_records_by_event_id(pool: &Pool<Postgres>, event_id: Uuid) -> Result<Vec<DbRecord>> {
    let records = sqlx::query_as::<_, DbRecord>(
        r#"
        SELECT event_id, person_id, present, note, marked_by, marked_at
        FROM attendance_records
        WHERE event_id = $1
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
