use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use dotenv::dotenv;
use rollcall_api::{build_opener, config::SchedulerConfig, services::AttendanceContext};
use rollcall_db::{create_pool, schema::initialize_database, store::PgStore};
use rollcall_mailer::{build_mailer, config::MailerConfig};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = SchedulerConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting attendance scheduler, interval {:?}", config.interval);

    let mailer = build_mailer(&MailerConfig::from_env()?)?;
    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    let ctx = AttendanceContext::from_backend(Arc::new(PgStore::new(db_pool)));
    let opener = build_opener(&ctx, mailer, &config.opener);

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = opener.run(Utc::now()).await {
                    error!("Opener pass failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Attendance scheduler shutting down");
                break;
            }
        }
    }

    Ok(())
}
