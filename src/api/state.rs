//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::invitation::InvitationService;
use crate::infrastructure::team::TeamService;

/// Services shared by every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub team_service: Arc<TeamService>,
    pub invitation_service: Arc<InvitationService>,
}

impl AppState {
    pub fn new(team_service: Arc<TeamService>, invitation_service: Arc<InvitationService>) -> Self {
        Self {
            team_service,
            invitation_service,
        }
    }
}
