//! Direct member management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::routes::teams::parse_team_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::MemberId;
use crate::domain::member::Member;
use crate::infrastructure::team::NewMemberRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberApiRequest {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: String,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id().as_str().to_string(),
            team_id: member.team_id().as_str().to_string(),
            name: member.name().to_string(),
            email: member.email().as_str().to_string(),
            phone: member.phone().map(|p| p.as_str().to_string()),
            role: member.role().map(String::from),
            created_at: member.created_at().to_rfc3339(),
        }
    }
}

/// POST /api/teams/{team_id}/members/
pub async fn add_member(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<AddMemberApiRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let team_id = parse_team_id(&team_id)?;
    debug!(team_id = %team_id, "Adding member");

    let member = state
        .team_service
        .add_member(
            &team_id,
            NewMemberRequest {
                name: request.name,
                email: request.email,
                phone: request.phone,
                role: request.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(&member))))
}

/// GET /api/teams/{team_id}/members/
pub async fn list_members(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let team_id = parse_team_id(&team_id)?;

    let members = state.team_service.list_members(&team_id).await?;

    Ok(Json(members.iter().map(MemberResponse::from).collect()))
}

/// DELETE /api/teams/{team_id}/members/{member_id}
pub async fn remove_member(
    State(state): State<AppState>,
    Path((team_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let member_id = MemberId::parse(&member_id)?;

    state.team_service.remove_member(&team_id, &member_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
