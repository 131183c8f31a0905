//! SMS sender that only logs, for development and tests

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::contact::PhoneNumber;
use crate::domain::sms::SmsSender;
use crate::domain::DomainError;

/// A message kept by a recording [`LogSmsSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// Writes outgoing messages to the log instead of delivering them
///
/// Only a sender built with [`LogSmsSender::recording`] keeps messages in
/// memory.
#[derive(Debug, Default)]
pub struct LogSmsSender {
    outbox: Option<Mutex<Vec<SentSms>>>,
}

impl LogSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender that also keeps every accepted message for inspection
    pub fn recording() -> Self {
        Self {
            outbox: Some(Mutex::new(Vec::new())),
        }
    }

    /// Messages accepted so far, oldest first; always empty unless recording
    pub fn sent(&self) -> Vec<SentSms> {
        self.outbox
            .as_ref()
            .and_then(|outbox| outbox.lock().ok().map(|outbox| outbox.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, phone: &PhoneNumber, message: &str) -> Result<(), DomainError> {
        info!(to = %phone, body = %message, "SMS (not delivered)");

        let Some(outbox) = &self.outbox else {
            return Ok(());
        };

        let mut outbox = outbox
            .lock()
            .map_err(|e| DomainError::internal(format!("SMS outbox poisoned: {}", e)))?;
        outbox.push(SentSms {
            to: phone.as_str().to_string(),
            body: message.to_string(),
        });

        Ok(())
    }
}
