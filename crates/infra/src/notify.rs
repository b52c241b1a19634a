//! Outbound notification port.
//!
//! The engine only hands messages over; delivery (SMTP or otherwise) belongs to
//! whatever implements [`Notifier`]. Callers log failures and move on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NotificationSettings;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Fire-and-forget message delivery.
pub trait Notifier: Send + Sync {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        (**self).send(to, subject, html_body)
    }
}

/// A message accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub from_name: String,
    pub from_email: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub queued_at: DateTime<Utc>,
}

fn check_recipient(to: &str) -> Result<(), NotifyError> {
    if to.trim().is_empty() || !to.contains('@') {
        return Err(NotifyError::InvalidRecipient(to.to_string()));
    }
    Ok(())
}

/// In-memory outbox. Messages are kept for inspection instead of being sent.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    settings: NotificationSettings,
    messages: Mutex<Vec<OutboundMessage>>,
    fail_next: AtomicBool,
}

impl OutboxNotifier {
    pub fn new(settings: NotificationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Reject the next message with `NotifyError::Delivery`.
    pub fn fail_next_send(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last_message(&self) -> Option<OutboundMessage> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        check_recipient(to)?;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NotifyError::Delivery(format!(
                "{}:{} refused the message",
                self.settings.smtp_server, self.settings.smtp_port
            )));
        }

        let message = OutboundMessage {
            from_name: self.settings.sender_name.clone(),
            from_email: self.settings.sender_email.clone(),
            to: to.trim().to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            queued_at: Utc::now(),
        };
        self.messages
            .lock()
            .map_err(|_| NotifyError::Delivery("outbox lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

/// Logs each message and drops it.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        check_recipient(to)?;
        tracing::info!(to = %to, subject = %subject, body_len = html_body.len(), "notification dropped (tracing notifier)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_records_messages_with_sender() {
        let outbox = OutboxNotifier::new(NotificationSettings {
            sender_name: "Registrar".to_string(),
            sender_email: "no-reply@example.com".to_string(),
            ..NotificationSettings::default()
        });
        outbox.send("layla@example.com", "Confirm your email", "<p>hi</p>").unwrap();

        let msg = outbox.last_message().unwrap();
        assert_eq!(msg.from_email, "no-reply@example.com");
        assert_eq!(msg.subject, "Confirm your email");
        assert_eq!(outbox.messages().len(), 1);
    }

    #[test]
    fn failure_hook_applies_once() {
        let outbox = OutboxNotifier::default();
        outbox.fail_next_send();
        assert!(matches!(outbox.send("a@b.com", "s", "b"), Err(NotifyError::Delivery(_))));
        assert!(outbox.send("a@b.com", "s", "b").is_ok());
        assert_eq!(outbox.messages().len(), 1);
    }

    #[test]
    fn rejects_blank_recipient() {
        assert!(matches!(
            TracingNotifier.send(" ", "s", "b"),
            Err(NotifyError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn message_serializes_for_inspection() {
        let outbox = OutboxNotifier::default();
        outbox.send("a@b.com", "Subject", "<b>x</b>").unwrap();
        let json = serde_json::to_value(outbox.last_message().unwrap()).unwrap();
        assert_eq!(json["to"], "a@b.com");
        assert_eq!(json["html_body"], "<b>x</b>");
    }
}
