//! Provider-backed senders over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::message::{Channel, Delivery, Message};
use crate::sender::{EmailSender, SendError, SmsSender};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Transactional email API settings (Resend-compatible `POST /emails`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailApiConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// Twilio-style Messages API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsApiConfig {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

fn http_client() -> Result<reqwest::Client, SendError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SendError::Transport(e.to_string()))
}

async fn provider_error(resp: reqwest::Response) -> SendError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    SendError::Provider { status, body }
}

#[derive(Debug, Deserialize)]
struct EmailApiResponse {
    id: Option<String>,
}

/// Sends email through a JSON HTTP API with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    config: EmailApiConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailApiConfig) -> Result<Self, SendError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, to: &str, message: &Message) -> Result<Delivery, SendError> {
        if !to.contains('@') {
            return Err(SendError::InvalidRecipient(to.to_string()));
        }

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "from": self.config.from,
                "to": [to],
                "subject": message.subject,
                "html": message.html,
                "text": message.text,
            }))
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(provider_error(resp).await);
        }

        // A 2xx without a parseable body still counts as accepted.
        let provider_id = resp
            .json::<EmailApiResponse>()
            .await
            .ok()
            .and_then(|r| r.id);
        Ok(Delivery::Sent { provider_id })
    }
}

#[derive(Debug, Deserialize)]
struct SmsApiResponse {
    sid: Option<String>,
}

/// Sends SMS through the Twilio Messages API (form POST + basic auth).
#[derive(Debug, Clone)]
pub struct TwilioSmsSender {
    client: reqwest::Client,
    config: SmsApiConfig,
}

impl TwilioSmsSender {
    pub fn new(config: SmsApiConfig) -> Result<Self, SendError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery, SendError> {
        if to.is_empty() {
            return Err(SendError::InvalidRecipient(to.to_string()));
        }
        if self.config.account_sid.is_empty() {
            return Err(SendError::NotConfigured(Channel::Sms));
        }

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", self.config.from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(provider_error(resp).await);
        }

        let provider_id = resp
            .json::<SmsApiResponse>()
            .await
            .ok()
            .and_then(|r| r.sid);
        Ok(Delivery::Sent { provider_id })
    }
}
