//! Concurrent notification fan-out.
//!
//! Every (recipient, channel) pair becomes its own task. All tasks are started
//! before any is awaited, so one slow or failing provider call never holds up
//! or cancels the others. There is no retry and no ordering between sends.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::message::{Channel, Delivery, Outbound, Recipient};
use crate::sender::{EmailSender, SendError, SmsSender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub channel: Channel,
    pub recipient: String,
    pub error: String,
}

/// Counts of what happened during one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub recipients: usize,
    pub emails_sent: usize,
    pub sms_sent: usize,
    pub emails_failed: usize,
    pub sms_failed: usize,
    /// Sends not attempted because the channel has no provider configured.
    pub skipped: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.emails_sent + self.sms_sent + self.emails_failed + self.sms_failed + self.skipped
    }

    fn record(&mut self, channel: Channel, recipient: String, outcome: Result<Delivery, SendError>) {
        match (channel, outcome) {
            (_, Ok(Delivery::Skipped)) => self.skipped += 1,
            (Channel::Email, Ok(Delivery::Sent { .. })) => self.emails_sent += 1,
            (Channel::Sms, Ok(Delivery::Sent { .. })) => self.sms_sent += 1,
            (channel, Err(e)) => {
                match channel {
                    Channel::Email => self.emails_failed += 1,
                    Channel::Sms => self.sms_failed += 1,
                }
                self.failures.push(DeliveryFailure {
                    channel,
                    recipient,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Drop repeated addresses so nobody gets the same notice twice.
///
/// A recipient whose email was already seen keeps only its phone (and vice
/// versa); one with no unseen address left is dropped. Order is preserved.
pub fn dedup_recipients(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen_emails = HashSet::new();
    let mut seen_phones = HashSet::new();
    let mut out = Vec::with_capacity(recipients.len());

    for mut r in recipients {
        if let Some(email) = &r.email {
            if !seen_emails.insert(email.to_lowercase()) {
                r.email = None;
            }
        }
        if let Some(phone) = &r.phone {
            if !seen_phones.insert(phone.clone()) {
                r.phone = None;
            }
        }
        if r.email.is_some() || r.phone.is_some() {
            out.push(r);
        }
    }
    out
}

/// Sends notices over email and SMS.
#[derive(Clone)]
pub struct NotificationDispatcher {
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
}

impl NotificationDispatcher {
    pub fn new(email: Arc<dyn EmailSender>, sms: Arc<dyn SmsSender>) -> Self {
        Self { email, sms }
    }

    /// Send each message over every channel its recipient has.
    pub async fn dispatch(&self, outbound: Vec<Outbound>) -> DispatchReport {
        let mut report = DispatchReport {
            recipients: outbound.len(),
            ..DispatchReport::default()
        };

        let mut tasks: Vec<(Channel, String, JoinHandle<Result<Delivery, SendError>>)> = Vec::new();
        for Outbound { recipient, message } in outbound {
            let label = recipient.label();

            if let Some(to) = recipient.email.clone() {
                let sender = self.email.clone();
                let message = message.clone();
                tasks.push((
                    Channel::Email,
                    label.clone(),
                    tokio::spawn(async move { sender.send_email(&to, &message).await }),
                ));
            }

            if let Some(to) = recipient.phone.clone() {
                let sender = self.sms.clone();
                let body = message.text.clone();
                tasks.push((
                    Channel::Sms,
                    label,
                    tokio::spawn(async move { sender.send_sms(&to, &body).await }),
                ));
            }
        }

        for (channel, label, handle) in tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(SendError::Transport(format!("send task aborted: {e}"))),
            };
            match &outcome {
                Ok(_) => tracing::debug!(%channel, recipient = %label, "notification delivered"),
                Err(e) => tracing::warn!(%channel, recipient = %label, error = %e, "notification failed"),
            }
            report.record(channel, label, outcome);
        }

        tracing::info!(
            recipients = report.recipients,
            attempted = report.attempted(),
            emails_sent = report.emails_sent,
            sms_sent = report.sms_sent,
            failed = report.failures.len(),
            skipped = report.skipped,
            "notification fan-out finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::sender::{LogOnlySender, RecordingSender};
    use cargodesk_core::Locale;

    fn recipient(name: &str, email: Option<&str>, phone: Option<&str>) -> Recipient {
        Recipient {
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            locale: Locale::En,
        }
    }

    fn outbound(r: Recipient) -> Outbound {
        Outbound {
            recipient: r,
            message: Message {
                subject: "Update".to_string(),
                text: "Your package moved".to_string(),
                html: "<p>Your package moved</p>".to_string(),
            },
        }
    }

    #[test]
    fn dedup_keeps_unseen_channels() {
        let out = dedup_recipients(vec![
            recipient("A", Some("a@example.com"), Some("+15550001")),
            recipient("A again", Some("A@example.com"), Some("+15550002")),
            recipient("B", None, Some("+15550001")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].email, None);
        assert_eq!(out[1].phone.as_deref(), Some("+15550002"));
    }

    #[tokio::test]
    async fn sends_every_channel_of_every_recipient() {
        let email = Arc::new(RecordingSender::new());
        let sms = Arc::new(RecordingSender::new());
        let dispatcher = NotificationDispatcher::new(email.clone(), sms.clone());

        let report = dispatcher
            .dispatch(vec![
                outbound(recipient("A", Some("a@example.com"), Some("+15550001"))),
                outbound(recipient("B", Some("b@example.com"), None)),
                outbound(recipient("C", None, Some("+15550003"))),
            ])
            .await;

        assert_eq!(report.recipients, 3);
        assert_eq!(report.emails_sent, 2);
        assert_eq!(report.sms_sent, 2);
        assert!(report.failures.is_empty());
        assert_eq!(email.sent().len(), 2);
        assert_eq!(sms.sent().len(), 2);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let email = Arc::new(RecordingSender::failing_for(["b@example.com"]));
        let sms = Arc::new(RecordingSender::new());
        let dispatcher = NotificationDispatcher::new(email.clone(), sms);

        let report = dispatcher
            .dispatch(vec![
                outbound(recipient("A", Some("a@example.com"), None)),
                outbound(recipient("B", Some("b@example.com"), None)),
                outbound(recipient("C", Some("c@example.com"), None)),
            ])
            .await;

        assert_eq!(report.emails_sent, 2);
        assert_eq!(report.emails_failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].channel, Channel::Email);
        assert!(report.failures[0].recipient.contains("b@example.com"));
        assert_eq!(report.attempted(), 3);
    }

    #[tokio::test]
    async fn unconfigured_channels_count_as_skipped() {
        let dispatcher = NotificationDispatcher::new(Arc::new(LogOnlySender), Arc::new(LogOnlySender));
        let report = dispatcher
            .dispatch(vec![outbound(recipient("A", Some("a@example.com"), Some("+15550001")))])
            .await;
        assert_eq!(report.skipped, 2);
        assert_eq!(report.emails_sent + report.sms_sent, 0);
    }

    #[tokio::test]
    async fn empty_fan_out_is_a_no_op() {
        let dispatcher = NotificationDispatcher::new(Arc::new(LogOnlySender), Arc::new(LogOnlySender));
        let report = dispatcher.dispatch(Vec::new()).await;
        assert_eq!(report, DispatchReport::default());
    }
}
