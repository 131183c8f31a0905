//! PostgreSQL invitation repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::{InvitationId, TeamId};
use crate::domain::invitation::{
    Invitation, InvitationRepository, InvitationStateError, InvitationToken, OtpChallenge,
};
use crate::domain::member::Member;
use crate::domain::DomainError;
use crate::infrastructure::member::insert_member;
use crate::infrastructure::team::team_full;

const INVITATION_COLUMNS: &str = "id, team_id, email, phone, token, is_used, expires_at, created_at, \
     otp_code, otp_verified, otp_created_at, otp_expires_at, phone_verified_at";

/// PostgreSQL implementation of InvitationRepository
#[derive(Debug, Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn get_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE token = $1",
            INVITATION_COLUMNS
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get invitation: {}", e)))?;

        row.as_ref().map(row_to_invitation).transpose()
    }

    async fn create(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        let otp = invitation.otp();

        sqlx::query(
            r#"
            INSERT INTO invitations (id, team_id, email, phone, token, is_used, expires_at,
                                     created_at, otp_code, otp_verified, otp_created_at,
                                     otp_expires_at, phone_verified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(invitation.id().as_str())
        .bind(invitation.team_id().as_str())
        .bind(invitation.email().as_str())
        .bind(invitation.phone().map(PhoneNumber::as_str))
        .bind(invitation.token().as_str())
        .bind(invitation.is_used())
        .bind(invitation.expires_at())
        .bind(invitation.created_at())
        .bind(otp.map(OtpChallenge::code))
        .bind(otp.is_some_and(OtpChallenge::is_verified))
        .bind(otp.map(OtpChallenge::created_at))
        .bind(otp.map(OtpChallenge::expires_at))
        .bind(invitation.phone_verified_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("Invitation token already exists")
            } else if msg.contains("foreign key") {
                DomainError::not_found("Team not found")
            } else {
                DomainError::storage(format!("Failed to create invitation: {}", e))
            }
        })?;

        Ok(invitation)
    }

    async fn update(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        let otp = invitation.otp();

        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET is_used = is_used OR $2, otp_code = $3, otp_verified = $4, otp_created_at = $5,
                otp_expires_at = $6, phone_verified_at = $7
            WHERE token = $1
            "#,
        )
        .bind(invitation.token().as_str())
        .bind(invitation.is_used())
        .bind(otp.map(OtpChallenge::code))
        .bind(otp.is_some_and(OtpChallenge::is_verified))
        .bind(otp.map(OtpChallenge::created_at))
        .bind(otp.map(OtpChallenge::expires_at))
        .bind(invitation.phone_verified_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update invitation: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Invitation not found"));
        }

        Ok(invitation)
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE team_id = $1 ORDER BY created_at, id",
            INVITATION_COLUMNS
        ))
        .bind(team_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list invitations: {}", e)))?;

        rows.iter().map(row_to_invitation).collect()
    }

    async fn find_active(
        &self,
        team_id: &TeamId,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invitations \
             WHERE team_id = $1 AND email = $2 AND is_used = FALSE AND expires_at >= $3 \
             ORDER BY created_at LIMIT 1",
            INVITATION_COLUMNS
        ))
        .bind(team_id.as_str())
        .bind(email.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find invitation: {}", e)))?;

        row.as_ref().map(row_to_invitation).transpose()
    }

    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM invitations WHERE team_id = $1")
            .bind(team_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete invitations: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn redeem(
        &self,
        token: &InvitationToken,
        member: Member,
        max_members: u32,
    ) -> Result<Member, DomainError> {
        let fail =
            |e: sqlx::Error| DomainError::storage(format!("Failed to redeem invitation: {}", e));

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let claimed = sqlx::query(
            "UPDATE invitations SET is_used = TRUE WHERE token = $1 AND is_used = FALSE",
        )
        .bind(token.as_str())
        .execute(&mut *tx)
        .await
        .map_err(fail)?;

        if claimed.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invitations WHERE token = $1)")
                    .bind(token.as_str())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(fail)?;

            return Err(if exists {
                InvitationStateError::AlreadyUsed.into()
            } else {
                DomainError::not_found("Invitation not found")
            });
        }

        // Row lock on the team serializes concurrent joins for the same team
        sqlx::query("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(member.team_id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(fail)?;

        let current: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE team_id = $1")
            .bind(member.team_id().as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(fail)?;

        if current >= i64::from(max_members) {
            return Err(team_full(max_members));
        }

        insert_member(&mut *tx, &member).await?;
        tx.commit().await.map_err(fail)?;

        Ok(member)
    }
}

fn row_to_invitation(row: &sqlx::postgres::PgRow) -> Result<Invitation, DomainError> {
    let id: String = row.get("id");
    let team_id: String = row.get("team_id");
    let email: String = row.get("email");
    let phone: Option<String> = row.get("phone");
    let token: String = row.get("token");
    let expires_at: DateTime<Utc> = row.get("expires_at");
    let created_at: DateTime<Utc> = row.get("created_at");
    let otp_code: Option<String> = row.get("otp_code");
    let otp_created_at: Option<DateTime<Utc>> = row.get("otp_created_at");
    let otp_expires_at: Option<DateTime<Utc>> = row.get("otp_expires_at");

    let id = InvitationId::parse(&id)
        .map_err(|e| DomainError::storage(format!("Invalid invitation ID in database: {}", e)))?;
    let team_id = TeamId::parse(&team_id)
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let email = Email::parse(&email)
        .map_err(|e| DomainError::storage(format!("Invalid invitation email in database: {}", e)))?;
    let phone = phone
        .map(PhoneNumber::parse)
        .transpose()
        .map_err(|e| DomainError::storage(format!("Invalid invitation phone in database: {}", e)))?;

    let otp = match (otp_code, otp_created_at, otp_expires_at) {
        (Some(code), Some(created), Some(expires)) => Some(OtpChallenge::restore(
            code,
            row.get("otp_verified"),
            expires,
            created,
        )),
        _ => None,
    };

    Ok(Invitation::restore(
        id,
        team_id,
        email,
        phone,
        InvitationToken::new(token),
        row.get("is_used"),
        expires_at,
        created_at,
        otp,
        row.get("phone_verified_at"),
    ))
}
