//! # Rollcall API
//!
//! Web server and services for attendance check-in: recurring schedules that
//! open check-in events on time, leader notifications, the check-in roster
//! view and attendance record writing.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: Request extraction and response shaping
//! - **Services**: The attendance operations, written against storage traits
//! - **Middleware**: Caller resolution and error mapping
//! - **Config**: Environment configuration

/// Configuration module for API and scheduler settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Attendance operations
pub mod services;

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use eyre::Result;
use rollcall_db::{store::PgStore, DbPool};
use rollcall_mailer::Mailer;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::{
    config::OpenerSettings,
    services::{dispatcher::NotificationDispatcher, opener::EventOpener, AttendanceContext},
};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub ctx: AttendanceContext,
    pub opener: EventOpener,
    /// Secret the periodic trigger must present; `None` disables the endpoint
    pub cron_secret: Option<String>,
}

impl ApiState {
    pub fn new(
        ctx: AttendanceContext,
        mailer: Arc<dyn Mailer>,
        settings: &OpenerSettings,
        cron_secret: Option<String>,
    ) -> Self {
        let opener = build_opener(&ctx, mailer, settings);
        Self {
            ctx,
            opener,
            cron_secret,
        }
    }
}

/// Wires an [`EventOpener`] and its dispatcher to the context's store.
pub fn build_opener(ctx: &AttendanceContext, mailer: Arc<dyn Mailer>, settings: &OpenerSettings) -> EventOpener {
    let dispatcher = NotificationDispatcher::new(
        ctx.store.clone(),
        mailer,
        settings.app_base_url.clone(),
        settings.store_timeout,
        settings.delivery_timeout,
    );
    EventOpener::new(ctx.store.clone(), dispatcher, settings.store_timeout)
}

/// Builds the router with every endpoint attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::cron::routes())
        .merge(routes::attendance::routes())
        .merge(routes::notifications::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool, mailer: Arc<dyn Mailer>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET not set, /api/cron/attendance will refuse every call");
    }

    let ctx = AttendanceContext::from_backend(Arc::new(PgStore::new(db_pool)));
    let state = Arc::new(ApiState::new(
        ctx,
        mailer,
        &config.opener,
        config.cron_secret.clone(),
    ));

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout; a timed out request answers 408
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::timeout::TimeoutLayer::new(config.request_timeout))
            .into_inner(),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
