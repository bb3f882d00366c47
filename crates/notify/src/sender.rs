use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{Channel, Delivery, Message};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("{0} channel is not configured")]
    NotConfigured(Channel),

    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider rejected the message (HTTP {status}): {body}")]
    Provider { status: u16, body: String },
}

/// Transactional email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, message: &Message) -> Result<Delivery, SendError>;
}

/// SMS delivery.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery, SendError>;
}

/// Sender used when a provider has no credentials: logs the message and reports it skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlySender;

#[async_trait]
impl EmailSender for LogOnlySender {
    async fn send_email(&self, to: &str, message: &Message) -> Result<Delivery, SendError> {
        tracing::info!(channel = "email", to, subject = %message.subject, "email provider not configured; message logged only");
        Ok(Delivery::Skipped)
    }
}

#[async_trait]
impl SmsSender for LogOnlySender {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery, SendError> {
        tracing::info!(channel = "sms", to, body, "sms provider not configured; message logged only");
        Ok(Delivery::Skipped)
    }
}

/// A message captured by [`RecordingSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub channel: Channel,
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
}

/// In-memory sender for tests and local runs.
///
/// Addresses listed in `fail_for` are rejected with a provider error so
/// partial-failure behavior can be exercised.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Recorded>>,
    fail_for: Vec<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: addresses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sent(&self) -> Vec<Recorded> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, entry: Recorded) -> Result<Delivery, SendError> {
        if self.fail_for.iter().any(|a| a == &entry.to) {
            return Err(SendError::Provider {
                status: 400,
                body: format!("rejected {}", entry.to),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(entry);
        }
        Ok(Delivery::Sent { provider_id: None })
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_email(&self, to: &str, message: &Message) -> Result<Delivery, SendError> {
        self.record(Recorded {
            channel: Channel::Email,
            to: to.to_string(),
            subject: Some(message.subject.clone()),
            body: message.text.clone(),
        })
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery, SendError> {
        self.record(Recorded {
            channel: Channel::Sms,
            to: to.to_string(),
            subject: None,
            body: body.to_string(),
        })
    }
}
