//! Outbound SMS capability used to deliver OTP codes

use async_trait::async_trait;

use crate::domain::contact::PhoneNumber;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Sends a text message to a phone number
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `message` to `phone`
    async fn send(&self, phone: &PhoneNumber, message: &str) -> Result<(), DomainError>;
}

/// Text sent to an invitee along with their OTP
pub fn otp_message(code: &str, valid_minutes: i64) -> String {
    format!(
        "Your OTP for hackathon team invitation is: {}. Valid for {} minutes.",
        code, valid_minutes
    )
}
