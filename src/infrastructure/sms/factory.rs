//! SMS sender selection from configuration

use std::sync::Arc;

use tracing::{info, warn};

use super::log_sender::LogSmsSender;
use super::twilio::{TwilioCredentials, TwilioSmsSender};
use crate::config::SmsConfig;
use crate::domain::sms::SmsSender;
use crate::domain::DomainError;

/// Supported SMS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProvider {
    Mock,
    Twilio,
}

impl SmsProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mock" | "log" | "console" => Some(Self::Mock),
            "twilio" => Some(Self::Twilio),
            _ => None,
        }
    }
}

/// Builds the configured SMS sender
#[derive(Debug)]
pub struct SmsSenderFactory;

impl SmsSenderFactory {
    /// Twilio without complete credentials falls back to the logging sender
    pub fn create(config: &SmsConfig) -> Result<Arc<dyn SmsSender>, DomainError> {
        let provider = SmsProvider::from_str(&config.provider).ok_or_else(|| {
            DomainError::configuration(format!("Unknown SMS provider '{}'", config.provider))
        })?;

        match provider {
            SmsProvider::Mock => {
                info!("Using logging SMS sender");
                Ok(Arc::new(LogSmsSender::new()))
            }
            SmsProvider::Twilio => match Self::twilio_credentials(config) {
                Some(credentials) => {
                    info!(from = %credentials.from_number, "Using Twilio SMS sender");
                    let sender =
                        TwilioSmsSender::with_base_url(credentials, config.api_base_url.clone())?;
                    Ok(Arc::new(sender))
                }
                None => {
                    warn!("Twilio credentials incomplete, falling back to logging SMS sender");
                    Ok(Arc::new(LogSmsSender::new()))
                }
            },
        }
    }

    fn twilio_credentials(config: &SmsConfig) -> Option<TwilioCredentials> {
        let present = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        Some(TwilioCredentials {
            account_sid: present(&config.account_sid)?,
            auth_token: present(&config.auth_token)?,
            from_number: present(&config.from_number)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(SmsProvider::from_str("mock"), Some(SmsProvider::Mock));
        assert_eq!(SmsProvider::from_str("Twilio"), Some(SmsProvider::Twilio));
        assert_eq!(SmsProvider::from_str("carrier-pigeon"), None);
    }

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let config = SmsConfig {
            provider: "carrier-pigeon".to_string(),
            ..SmsConfig::default()
        };

        let result = SmsSenderFactory::create(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_twilio_credentials_require_every_field() {
        let mut config = SmsConfig {
            provider: "twilio".to_string(),
            account_sid: Some("AC123".to_string()),
            auth_token: Some("secret".to_string()),
            from_number: Some("  ".to_string()),
            ..SmsConfig::default()
        };
        assert!(SmsSenderFactory::twilio_credentials(&config).is_none());

        config.from_number = Some("+15550000000".to_string());
        assert!(SmsSenderFactory::twilio_credentials(&config).is_some());
    }

    #[test]
    fn test_incomplete_twilio_falls_back() {
        let config = SmsConfig {
            provider: "twilio".to_string(),
            ..SmsConfig::default()
        };

        assert!(SmsSenderFactory::create(&config).is_ok());
    }
}
