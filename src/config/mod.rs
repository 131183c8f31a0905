//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, InvitationConfig, LogFormat, LoggingConfig, ServerConfig, SmsConfig,
    StorageSettings,
};
