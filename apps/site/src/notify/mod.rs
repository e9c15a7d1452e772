//! Transactional email client.
//!
//! Every send is best-effort from the caller's point of view: callers record
//! the outcome in [`SideEffects`] and never fail their own operation on it.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod side_effects;
pub mod templates;

pub use side_effects::SideEffects;

use crate::config::Config;

const SEND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Email is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    team_inbox: Option<String>,
}

impl Mailer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if config.email_api_key.is_none() {
            warn!("EMAIL_API_KEY is not set; outgoing email will be skipped");
        }
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(SEND_TIMEOUT_SECS))
                .build()?,
            api_url: config.email_api_url.clone(),
            api_key: config.email_api_key.clone(),
            from: config.email_from.clone(),
            team_inbox: config.notify_email.clone(),
        })
    }

    pub fn team_inbox(&self) -> Option<&str> {
        self.team_inbox.as_deref()
    }

    pub async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let api_key = self.api_key.as_deref().ok_or(NotifyError::NotConfigured)?;

        let body = SendRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text,
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(subject = %email.subject, "email accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_key_is_not_configured() {
        let mailer = Mailer::from_config(&Config::for_tests(None)).unwrap();
        let email = Email {
            to: "a@example.com".into(),
            subject: "Hi".into(),
            text: "Body".into(),
            reply_to: None,
        };
        assert!(matches!(mailer.send(&email).await, Err(NotifyError::NotConfigured)));
    }

    #[test]
    fn test_send_request_shape() {
        let body = SendRequest {
            from: "Gatehouse <hello@gatehouse.dev>",
            to: ["a@example.com"],
            subject: "Hi",
            text: "Body",
            reply_to: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "a@example.com");
        assert!(json.get("reply_to").is_none());
    }
}
