//! Invitation infrastructure implementations

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresInvitationRepository;
pub use repository::StorageInvitationRepository;
pub use service::{
    InvitationDetails, InvitationService, JoinTeamRequest, NewInvitationRequest, OtpDispatch,
};
