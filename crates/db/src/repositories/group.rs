use crate::models::{DbGroupLeader, DbPerson, DbSmallGroup};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_active_groups(pool: &Pool<Postgres>, organization_id: Uuid) -> Result<Vec<DbSmallGroup>> {
    let groups = sqlx::query_as::<_, DbSmallGroup>(
        r#"
        SELECT g.id, g.organization_id, g.name, g.track, g.section, g.active,
               COALESCE(
                   array_agg(l.leader_identity::TEXT) FILTER (WHERE l.leader_identity IS NOT NULL),
                   '{}'
               ) AS leader_ids
        FROM small_groups g
        LEFT JOIN small_group_leaders l ON l.group_id = g.id
        WHERE g.organization_id = $1 AND g.active = TRUE
        GROUP BY g.id
        ORDER BY g.name ASC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

pub async fn get_groups_led_by(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    leader_identity: &str,
) -> Result<Vec<DbSmallGroup>> {
    let groups = sqlx::query_as::<_, DbSmallGroup>(
        r#"
        SELECT g.id, g.organization_id, g.name, g.track, g.section, g.active,
               COALESCE(
                   array_agg(l.leader_identity::TEXT) FILTER (WHERE l.leader_identity IS NOT NULL),
                   '{}'
               ) AS leader_ids
        FROM small_groups g
        LEFT JOIN small_group_leaders l ON l.group_id = g.id
        WHERE g.organization_id = $1
          AND g.active = TRUE
          AND EXISTS (
              SELECT 1 FROM small_group_leaders me
              WHERE me.group_id = g.id AND me.leader_identity = $2
          )
        GROUP BY g.id
        ORDER BY g.name ASC
        "#,
    )
    .bind(organization_id)
    .bind(leader_identity)
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

/// Distinct leaders of the organization's active groups.
pub async fn get_active_group_leaders(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
) -> Result<Vec<DbGroupLeader>> {
    let leaders = sqlx::query_as::<_, DbGroupLeader>(
        r#"
        SELECT DISTINCT l.leader_identity AS identity, u.name, u.email
        FROM small_group_leaders l
        JOIN small_groups g ON g.id = l.group_id
        LEFT JOIN org_users u
            ON u.organization_id = g.organization_id AND u.identity = l.leader_identity
        WHERE g.organization_id = $1 AND g.active = TRUE
        ORDER BY identity ASC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(leaders)
}

/// Roster members of an organization, optionally restricted to some groups.
pub async fn get_members(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    group_ids: Option<&[Uuid]>,
) -> Result<Vec<DbPerson>> {
    let members = sqlx::query_as::<_, DbPerson>(
        r#"
        SELECT id, name, small_group_id
        FROM people
        WHERE organization_id = $1
          AND ($2::UUID[] IS NULL OR small_group_id = ANY($2))
        ORDER BY name ASC
        "#,
    )
    .bind(organization_id)
    .bind(group_ids.map(<[Uuid]>::to_vec))
    .fetch_all(pool)
    .await?;

    Ok(members)
}
