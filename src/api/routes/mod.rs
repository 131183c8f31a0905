//! Team, member and invitation endpoints under `/api`

pub mod invitations;
pub mod members;
pub mod teams;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Collection routes answer with and without the trailing slash
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/{team_id}",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        // Members
        .route(
            "/teams/{team_id}/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/teams/{team_id}/members/",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/teams/{team_id}/members/{member_id}",
            delete(members::remove_member),
        )
        // Invitations
        .route(
            "/teams/{team_id}/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/teams/{team_id}/invitations/",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route("/invitations/verify-otp", post(invitations::verify_otp))
        .route("/invitations/{token}", get(invitations::get_invitation))
        .route(
            "/invitations/{token}/resend-otp",
            post(invitations::resend_otp),
        )
        .route("/invitations/{token}/join", post(invitations::join_team))
}
