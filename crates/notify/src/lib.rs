//! Outbound customer notifications: message templates, email/SMS senders and
//! the concurrent fan-out dispatcher.
//!
//! Layout:
//! - `message.rs`: recipients, rendered messages, delivery outcomes
//! - `templates.rs`: status-change wording per status and locale
//! - `sender.rs`: sender traits plus log-only and recording implementations
//! - `http.rs`: provider-backed senders (transactional email API, Twilio SMS)
//! - `dispatch.rs`: one send per recipient per channel, all at once

pub mod dispatch;
pub mod http;
pub mod message;
pub mod sender;
pub mod templates;

pub use dispatch::{dedup_recipients, DeliveryFailure, DispatchReport, NotificationDispatcher};
pub use http::{EmailApiConfig, HttpEmailSender, SmsApiConfig, TwilioSmsSender};
pub use message::{Channel, Delivery, Message, Outbound, Recipient};
pub use sender::{EmailSender, LogOnlySender, Recorded, RecordingSender, SendError, SmsSender};
pub use templates::{status_notice, NoticeSubject};
