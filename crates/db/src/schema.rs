use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Organization members and sessions are owned by the account layer; they
    // are created here so a fresh database can serve requests.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS org_users (
            organization_id UUID NOT NULL,
            identity VARCHAR(255) NOT NULL,
            name VARCHAR(255) NULL,
            email VARCHAR(255) NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'pending',
            status VARCHAR(32) NOT NULL DEFAULT 'pending',
            PRIMARY KEY (organization_id, identity)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(128) PRIMARY KEY,
            identity VARCHAR(255) NOT NULL,
            organization_id UUID NOT NULL,
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organization_permission_overrides (
            organization_id UUID NOT NULL,
            module VARCHAR(32) NOT NULL,
            role VARCHAR(32) NOT NULL,
            level VARCHAR(16) NOT NULL,
            PRIMARY KEY (organization_id, module, role)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create small_groups table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS small_groups (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            track VARCHAR(64) NULL,
            section VARCHAR(64) NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS small_group_leaders (
            group_id UUID NOT NULL REFERENCES small_groups(id) ON DELETE CASCADE,
            leader_identity VARCHAR(255) NOT NULL,
            PRIMARY KEY (group_id, leader_identity)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Roster directory
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS people (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            small_group_id UUID NULL REFERENCES small_groups(id) ON DELETE SET NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL,
            weekday SMALLINT NOT NULL,
            start_time_local VARCHAR(8) NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT valid_start_time CHECK (start_time_local ~ '^[0-9]{2}:[0-9]{2}(:[0-9]{2})?$')
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_events table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_events (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL,
            schedule_id UUID NULL REFERENCES attendance_schedules(id),
            event_date_local DATE NOT NULL,
            starts_at TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'open',
            opened_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            created_by_system BOOLEAN NOT NULL DEFAULT FALSE,
            CONSTRAINT attendance_events_schedule_date_key UNIQUE (schedule_id, event_date_local)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_records table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_records (
            event_id UUID NOT NULL REFERENCES attendance_events(id) ON DELETE CASCADE,
            person_id UUID NOT NULL,
            present BOOLEAN NOT NULL,
            note TEXT NULL,
            marked_by VARCHAR(255) NOT NULL,
            marked_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (event_id, person_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_guests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_guests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            event_id UUID NOT NULL REFERENCES attendance_events(id) ON DELETE CASCADE,
            group_id UUID NULL,
            guest_name VARCHAR(255) NOT NULL,
            note TEXT NULL,
            added_by VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create notifications table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL,
            recipient VARCHAR(255) NOT NULL,
            kind VARCHAR(64) NOT NULL,
            title VARCHAR(255) NOT NULL,
            body TEXT NOT NULL,
            action_link VARCHAR(512) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            read_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes; multiple statements need the simple query protocol
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_attendance_schedules_active ON attendance_schedules(active);
        CREATE INDEX IF NOT EXISTS idx_attendance_events_org_opened ON attendance_events(organization_id, opened_at DESC);
        CREATE INDEX IF NOT EXISTS idx_attendance_guests_event_id ON attendance_guests(event_id);
        CREATE INDEX IF NOT EXISTS idx_small_groups_organization_id ON small_groups(organization_id);
        CREATE INDEX IF NOT EXISTS idx_small_group_leaders_identity ON small_group_leaders(leader_identity);
        CREATE INDEX IF NOT EXISTS idx_people_organization_group ON people(organization_id, small_group_id);
        CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(organization_id, recipient, created_at DESC);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
