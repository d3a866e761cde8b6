use crate::models::{DbPermissionOverride, DbSession};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Looks up an unexpired session. Members without an organization row are
/// treated as pending.
pub async fn get_session_by_token(pool: &Pool<Postgres>, token: &str) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT s.identity, s.organization_id,
               COALESCE(u.role, 'pending') AS role,
               COALESCE(u.status, 'pending') AS status,
               u.name
        FROM sessions s
        LEFT JOIN org_users u
            ON u.organization_id = s.organization_id AND u.identity = s.identity
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn get_permission_overrides(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
) -> Result<Vec<DbPermissionOverride>> {
    let overrides = sqlx::query_as::<_, DbPermissionOverride>(
        r#"
        SELECT module, role, level
        FROM organization_permission_overrides
        WHERE organization_id = $1
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(overrides)
}
