//! Hackathon team registration API
//!
//! Teams invite members through shareable links. An invitation that carries a
//! phone number must be confirmed with an SMS one-time passcode before it can
//! be redeemed.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::invitation::ExpiryPolicy;
use domain::sms::SmsSender;
use domain::DomainError;
use infrastructure::{
    invitation::InvitationService,
    sms::SmsSenderFactory,
    storage::{Repositories, StorageConfig, StorageFactory},
    team::TeamService,
};

/// Create the application state for the configured storage and SMS backends
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    expiry_policy(config)?;

    let storage = StorageConfig::from_settings(&config.storage)?;
    info!(backend = ?storage.storage_type(), "Initializing storage");

    let repositories = StorageFactory::create(&storage).await?;
    let sms = SmsSenderFactory::create(&config.sms)?;

    Ok(build_app_state(config, repositories, sms)?)
}

fn expiry_policy(config: &AppConfig) -> Result<ExpiryPolicy, DomainError> {
    ExpiryPolicy::from_settings(
        config.invitation.invitation_ttl_hours,
        config.invitation.otp_ttl_minutes,
    )
}

/// Wire services over existing repositories and an SMS sender
pub fn build_app_state(
    config: &AppConfig,
    repositories: Repositories,
    sms: Arc<dyn SmsSender>,
) -> Result<AppState, DomainError> {
    let policy = expiry_policy(config)?;

    let team_service = TeamService::new(
        repositories.teams.clone(),
        repositories.members.clone(),
        repositories.invitations.clone(),
    );

    let invitation_service = InvitationService::new(
        repositories.teams,
        repositories.members,
        repositories.invitations,
        sms,
    )
    .with_policy(policy)
    .with_base_url(config.invitation.base_url.clone());

    Ok(AppState::new(
        Arc::new(team_service),
        Arc::new(invitation_service),
    ))
}
