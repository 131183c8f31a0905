//! SMS delivery implementations

mod factory;
mod log_sender;
mod twilio;

pub use factory::{SmsProvider, SmsSenderFactory};
pub use log_sender::{LogSmsSender, SentSms};
pub use twilio::{TwilioCredentials, TwilioSmsSender, DEFAULT_TWILIO_BASE_URL};
