//! Invitation, OTP and join endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::routes::members::MemberResponse;
use crate::api::routes::teams::parse_team_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::invitation::{Invitation, InvitationStatus, InvitationToken};
use crate::infrastructure::invitation::{InvitationDetails, JoinTeamRequest, NewInvitationRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationApiRequest {
    pub email: Email,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpApiRequest {
    pub invitation_token: String,
    pub otp_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinTeamApiRequest {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub team_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub token: String,
    pub invite_link: String,
    pub is_used: bool,
    pub status: InvitationStatus,
    pub expires_at: String,
    pub created_at: String,
}

impl InvitationResponse {
    fn new(invitation: &Invitation, invite_link: String, now: DateTime<Utc>) -> Self {
        Self {
            id: invitation.id().as_str().to_string(),
            team_id: invitation.team_id().as_str().to_string(),
            email: invitation.email().as_str().to_string(),
            phone: invitation.phone().map(|p| p.as_str().to_string()),
            token: invitation.token().as_str().to_string(),
            invite_link,
            is_used: invitation.is_used(),
            status: invitation.status_at(now),
            expires_at: invitation.expires_at().to_rfc3339(),
            created_at: invitation.created_at().to_rfc3339(),
        }
    }
}

/// Public view shown on the join page
#[derive(Debug, Clone, Serialize)]
pub struct InvitationDetailsResponse {
    pub invitation: InvitationSummary,
    pub team: TeamSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationSummary {
    pub email: String,
    pub phone: Option<String>,
    pub expires_at: String,
    pub requires_otp: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub description: Option<String>,
}

impl From<&InvitationDetails> for InvitationDetailsResponse {
    fn from(details: &InvitationDetails) -> Self {
        let invitation = &details.invitation;
        let team = &details.team;

        Self {
            invitation: InvitationSummary {
                email: invitation.email().as_str().to_string(),
                phone: invitation.phone().map(|p| p.as_str().to_string()),
                expires_at: invitation.expires_at().to_rfc3339(),
                requires_otp: invitation.requires_otp(),
            },
            team: TeamSummary {
                id: team.id().as_str().to_string(),
                name: team.name().to_string(),
                leader_name: team.leader_name().to_string(),
                description: team.description().map(String::from),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpSentResponse {
    pub message: String,
    pub phone: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpVerifiedResponse {
    pub message: String,
    pub verified: bool,
}

/// POST /api/teams/{team_id}/invitations/
pub async fn create_invitation(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<CreateInvitationApiRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    let team_id = parse_team_id(&team_id)?;

    let invitation = state
        .invitation_service
        .create(
            &team_id,
            NewInvitationRequest {
                email: request.email,
                phone: request.phone,
            },
        )
        .await?;

    let link = state.invitation_service.invite_link(&invitation);
    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse::new(&invitation, link, Utc::now())),
    ))
}

/// GET /api/teams/{team_id}/invitations/
pub async fn list_invitations(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let team_id = parse_team_id(&team_id)?;

    let invitations = state.invitation_service.list(&team_id).await?;
    let now = Utc::now();

    Ok(Json(
        invitations
            .iter()
            .map(|i| InvitationResponse::new(i, state.invitation_service.invite_link(i), now))
            .collect(),
    ))
}

/// GET /api/invitations/{token}
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationDetailsResponse>, ApiError> {
    debug!(token = %token, "Looking up invitation");

    let details = state
        .invitation_service
        .details(&InvitationToken::new(token))
        .await?;

    Ok(Json(InvitationDetailsResponse::from(&details)))
}

/// POST /api/invitations/{token}/resend-otp
pub async fn resend_otp(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<OtpSentResponse>, ApiError> {
    let dispatch = state
        .invitation_service
        .resend_otp(&InvitationToken::new(token))
        .await?;

    Ok(Json(OtpSentResponse {
        message: "OTP sent successfully".to_string(),
        phone: dispatch.phone.as_str().to_string(),
        expires_at: dispatch.expires_at.to_rfc3339(),
    }))
}

/// POST /api/invitations/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpApiRequest>,
) -> Result<Json<OtpVerifiedResponse>, ApiError> {
    state
        .invitation_service
        .verify_otp(&InvitationToken::new(request.invitation_token), &request.otp_code)
        .await?;

    Ok(Json(OtpVerifiedResponse {
        message: "OTP verified successfully".to_string(),
        verified: true,
    }))
}

/// POST /api/invitations/{token}/join
pub async fn join_team(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<JoinTeamApiRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let member = state
        .invitation_service
        .join(
            &InvitationToken::new(token),
            JoinTeamRequest {
                name: request.name,
                role: request.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(&member))))
}
