//! # API Configuration Module
//!
//! Loads configuration for the rollcall API server and the attendance
//! scheduler from environment variables, with defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Whole-request timeout (default: 30)
//! - `CRON_SECRET`: Bearer secret guarding the periodic trigger endpoint
//! - `APP_BASE_URL`: Public base URL used in notification e-mails
//! - `STORE_TIMEOUT_SECONDS`: Bound on one schedule's storage phase (default: 10)
//! - `DELIVERY_TIMEOUT_SECONDS`: Bound on one e-mail delivery (default: 10)
//! - `OPENER_INTERVAL_SECONDS`: Scheduler tick period (default: 300)

use eyre::{Result, WrapErr};
use std::{env, time::Duration};
use tracing::Level;

/// Timeouts and links shared by the opener and the notification dispatcher.
#[derive(Debug, Clone)]
pub struct OpenerSettings {
    /// Public base URL of the web app, without trailing slash
    pub app_base_url: String,
    pub store_timeout: Duration,
    pub delivery_timeout: Duration,
}

impl Default for OpenerSettings {
    fn default() -> Self {
        Self {
            app_base_url: "http://localhost:3000".to_string(),
            store_timeout: Duration::from_secs(10),
            delivery_timeout: Duration::from_secs(10),
        }
    }
}

impl OpenerSettings {
    pub fn from_env() -> Result<Self> {
        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let store_timeout = seconds_var("STORE_TIMEOUT_SECONDS", 10)?;
        let delivery_timeout = seconds_var("DELIVERY_TIMEOUT_SECONDS", 10)?;

        Ok(Self {
            app_base_url,
            store_timeout,
            delivery_timeout,
        })
    }
}

/// Configuration for the rollcall API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Secret expected on the periodic trigger endpoint (optional)
    pub cron_secret: Option<String>,

    /// Request timeout in seconds
    pub request_timeout: Duration,

    pub opener: OpenerSettings,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - One of the timeout values is not a whole number of seconds
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let log_level = parse_log_level(env::var("LOG_LEVEL").ok().as_deref());

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Security settings
        let cron_secret = env::var("CRON_SECRET").ok().filter(|s| !s.is_empty());

        // Performance settings
        let request_timeout = seconds_var("API_REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            cron_secret,
            request_timeout,
            opener: OpenerSettings::from_env()?,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `attendance-scheduler` binary.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub database_url: String,
    pub log_level: Level,
    /// Time between two opener passes
    pub interval: Duration,
    pub opener: OpenerSettings,
}

impl SchedulerConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;
        let log_level = parse_log_level(env::var("LOG_LEVEL").ok().as_deref());
        let interval = seconds_var("OPENER_INTERVAL_SECONDS", 300)?;

        Ok(Self {
            database_url,
            log_level,
            interval,
            opener: OpenerSettings::from_env()?,
        })
    }
}

/// Maps a `LOG_LEVEL` value to a tracing level, defaulting to INFO.
pub fn parse_log_level(value: Option<&str>) -> Level {
    match value.unwrap_or("info") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn seconds_var(name: &str, default: u64) -> Result<Duration> {
    parse_seconds(name, env::var(name).ok().as_deref(), default)
}

/// Parses a whole number of seconds, falling back to `default` when unset.
pub fn parse_seconds(name: &str, value: Option<&str>, default: u64) -> Result<Duration> {
    let seconds = match value {
        Some(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {} value", name))?,
        None => default,
    };
    Ok(Duration::from_secs(seconds))
}
