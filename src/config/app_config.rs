use serde::Deserialize;

use crate::domain::invitation::{DEFAULT_INVITATION_TTL_HOURS, DEFAULT_OTP_TTL_MINUTES};
use crate::infrastructure::sms::DEFAULT_TWILIO_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub invitation: InvitationConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which backend holds teams, members and invitations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Apply schema migrations when the server starts
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    /// Frontend origin used to build invite links
    pub base_url: String,
    pub invitation_ttl_hours: i64,
    pub otp_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// `mock` or `twilio`
    pub provider: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    pub api_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            max_connections: 10,
            run_migrations: true,
        }
    }
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            invitation_ttl_hours: DEFAULT_INVITATION_TTL_HOURS,
            otp_ttl_minutes: DEFAULT_OTP_TTL_MINUTES,
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            account_sid: None,
            auth_token: None,
            from_number: None,
            api_base_url: DEFAULT_TWILIO_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Layered load: `config/default`, `config/local`, then `APP__*` env vars
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
