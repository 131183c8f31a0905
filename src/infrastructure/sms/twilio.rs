//! Twilio SMS delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::contact::PhoneNumber;
use crate::domain::sms::SmsSender;
use crate::domain::DomainError;

pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";
const PROVIDER: &str = "twilio";

/// Credentials for the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: String,
}

/// Sends SMS through the Twilio REST API
#[derive(Debug)]
pub struct TwilioSmsSender {
    client: Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioSmsSender {
    pub fn new(credentials: TwilioCredentials) -> Result<Self, DomainError> {
        Self::with_base_url(credentials, DEFAULT_TWILIO_BASE_URL)
    }

    pub fn with_base_url(
        credentials: TwilioCredentials,
        base_url: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::provider(PROVIDER, format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, phone: &PhoneNumber, message: &str) -> Result<(), DomainError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[
                ("To", phone.as_str()),
                ("From", self.credentials.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                DomainError::provider(PROVIDER, reason)
            })?;

        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<TwilioError>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| "no error detail".to_string());
            warn!(status = status.as_u16(), detail = %detail, "Twilio rejected SMS");

            return Err(DomainError::provider(
                PROVIDER,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }

        match response.json::<TwilioMessage>().await {
            Ok(body) => debug!(sid = %body.sid, to = %phone, "SMS accepted by Twilio"),
            Err(_) => debug!(to = %phone, "SMS accepted by Twilio"),
        }

        Ok(())
    }
}
