//! Team infrastructure implementations

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresTeamRepository;
pub use repository::StorageTeamRepository;
pub(crate) use service::{team_full, team_not_found};
pub use service::{CreateTeamRequest, NewMemberRequest, TeamRoster, TeamService, UpdateTeamRequest};
