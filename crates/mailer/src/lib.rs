//! Outbound e-mail for attendance notifications.
//!
//! [`Mailer`] is the seam the notification dispatcher sends through.
//! [`HttpMailer`] posts to a JSON mail API; [`LogMailer`] only logs and is
//! used when no API endpoint is configured.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub mod config;

use crate::config::MailerConfig;

/// A single message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Mail API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[mockall::automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// Delivers through an HTTP JSON mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    from_email: String,
    from_name: String,
}

impl HttpMailer {
    pub fn new(api_url: String, config: &MailerConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), DeliveryError> {
        if !message.to.contains('@') {
            return Err(DeliveryError::InvalidMessage(format!(
                "'{}' is not an e-mail address",
                message.to
            )));
        }

        let request = SendRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &message.to,
                    name: message.to_name.as_deref(),
                }],
            }],
            from: Address {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            subject: &message.subject,
            content: vec![Content {
                kind: "text/html",
                value: &message.html,
            }],
        };

        let response = self.client.post(&self.api_url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        debug!("Delivered '{}' to {}", message.subject, message.to);
        Ok(())
    }
}

/// Drops every message after logging it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), DeliveryError> {
        info!(
            "Mail delivery disabled, not sending '{}' to {}",
            message.subject, message.to
        );
        Ok(())
    }
}

/// Builds the mailer described by `config`.
pub fn build_mailer(config: &MailerConfig) -> Result<Arc<dyn Mailer>, DeliveryError> {
    match &config.api_url {
        Some(url) => {
            info!("Sending mail through {}", url);
            Ok(Arc::new(HttpMailer::new(url.clone(), config)?))
        }
        None => {
            info!("MAIL_API_URL not set, outbound mail is disabled");
            Ok(Arc::new(LogMailer))
        }
    }
}
