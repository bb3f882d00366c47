use serde::{Deserialize, Serialize};

use cargodesk_core::Locale;

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// Someone to notify, with whatever channels they have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub locale: Locale,
}

impl Recipient {
    /// Short identifier for logs and failure reports.
    pub fn label(&self) -> String {
        match (&self.email, &self.phone) {
            (Some(e), _) => format!("{} <{}>", self.name, e),
            (None, Some(p)) => format!("{} <{}>", self.name, p),
            (None, None) => self.name.clone(),
        }
    }
}

/// A rendered message. SMS uses `text` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// A message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: Message,
}

/// Result of a single successful send call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the provider.
    Sent { provider_id: Option<String> },
    /// Deliberately not sent (channel not configured).
    Skipped,
}
