//! Team endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::routes::members::MemberResponse;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::team::{TeamQuery, DEFAULT_TEAM_PAGE_SIZE, DEFAULT_TEAM_SIZE};
use crate::infrastructure::team::{CreateTeamRequest, TeamRoster, UpdateTeamRequest};

fn default_max_members() -> u32 {
    DEFAULT_TEAM_SIZE
}

/// Request to register a team
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub name: String,
    pub leader_name: String,
    pub leader_email: Email,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_max_members")]
    pub max_members: u32,
}

/// Partial team update
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeamApiRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_members: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListTeamsParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_TEAM_PAGE_SIZE
}

/// Team with its current members
#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub leader_email: String,
    pub description: Option<String>,
    pub max_members: u32,
    pub created_at: String,
    pub updated_at: String,
    pub members: Vec<MemberResponse>,
}

impl From<&TeamRoster> for TeamResponse {
    fn from(roster: &TeamRoster) -> Self {
        let team = &roster.team;

        Self {
            id: team.id().as_str().to_string(),
            name: team.name().to_string(),
            leader_name: team.leader_name().to_string(),
            leader_email: team.leader_email().as_str().to_string(),
            description: team.description().map(String::from),
            max_members: team.max_members(),
            created_at: team.created_at().to_rfc3339(),
            updated_at: team.updated_at().to_rfc3339(),
            members: roster.members.iter().map(MemberResponse::from).collect(),
        }
    }
}

pub(crate) fn parse_team_id(raw: &str) -> Result<TeamId, ApiError> {
    TeamId::parse(raw).map_err(ApiError::from)
}

/// POST /api/teams/
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    debug!(name = %request.name, "Creating team");

    let roster = state
        .team_service
        .create(CreateTeamRequest {
            name: request.name,
            leader_name: request.leader_name,
            leader_email: request.leader_email,
            description: request.description,
            max_members: request.max_members,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&roster))))
}

/// GET /api/teams/?skip=&limit=
pub async fn list_teams(
    State(state): State<AppState>,
    Query(params): Query<ListTeamsParams>,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    debug!(skip = params.skip, limit = params.limit, "Listing teams");

    let query = TeamQuery::new()
        .with_skip(params.skip)
        .with_limit(params.limit);
    let rosters = state.team_service.list(&query).await?;

    Ok(Json(rosters.iter().map(TeamResponse::from).collect()))
}

/// GET /api/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    debug!(team_id = %team_id, "Getting team");

    let roster = state.team_service.get(&team_id).await?;

    Ok(Json(TeamResponse::from(&roster)))
}

/// PUT /api/teams/{team_id}
pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;

    let roster = state
        .team_service
        .update(
            &team_id,
            UpdateTeamRequest {
                name: request.name,
                description: request.description,
                max_members: request.max_members,
            },
        )
        .await?;

    Ok(Json(TeamResponse::from(&roster)))
}

/// DELETE /api/teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team_id = parse_team_id(&team_id)?;

    state.team_service.delete(&team_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
