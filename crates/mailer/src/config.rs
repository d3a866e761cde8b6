use eyre::{Result, WrapErr};
use std::env;

/// Configuration for outbound e-mail delivery.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Endpoint of the JSON mail API. No mail is sent when unset.
    pub api_url: Option<String>,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// Per-message timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            from_email: "noreply@rollcall.app".to_string(),
            from_name: "Rollcall".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl MailerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_url = env::var("MAIL_API_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let from_email = env::var("MAIL_FROM").unwrap_or(defaults.from_email);
        let from_name = env::var("MAIL_FROM_NAME").unwrap_or(defaults.from_name);

        let timeout_seconds = match env::var("MAIL_TIMEOUT_SECONDS") {
            Ok(value) => value.parse().wrap_err("Invalid MAIL_TIMEOUT_SECONDS value")?,
            Err(_) => defaults.timeout_seconds,
        };

        Ok(Self {
            api_url,
            from_email,
            from_name,
            timeout_seconds,
        })
    }

    /// Whether messages will actually leave the process.
    pub fn delivery_enabled(&self) -> bool {
        self.api_url.is_some()
    }
}
