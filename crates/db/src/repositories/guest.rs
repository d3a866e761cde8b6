use crate::models::DbGuest;
use eyre::Result;
use rollcall_core::models::record::NewGuest;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_guest(pool: &Pool<Postgres>, guest: &NewGuest) -> Result<DbGuest> {
    let id = Uuid::new_v4();

    let guest = sqlx::query_as::<_, DbGuest>(
        r#"
        INSERT INTO attendance_guests (id, event_id, group_id, guest_name, note, added_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, event_id, group_id, guest_name, note, added_by, created_at
        "#,
    )
    .bind(id)
    .bind(guest.event_id)
    .bind(guest.group_id)
    .bind(&guest.guest_name)
    .bind(&guest.note)
    .bind(&guest.added_by)
    .bind(guest.created_at)
    .fetch_one(pool)
    .await?;

    Ok(guest)
}

pub async fn get_guests_by_event_id(pool: &Pool<Postgres>, event_id: Uuid) -> Result<Vec<DbGuest>> {
    let guests = sqlx::query_as::<_, DbGuest>(
        r#"
        SELECT id, event_id, group_id, guest_name, note, added_by, created_at
        FROM attendance_guests
        WHERE event_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(guests)
}
