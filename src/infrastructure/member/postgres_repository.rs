//! PostgreSQL member repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::{MemberId, TeamId};
use crate::domain::member::{Member, MemberRepository};
use crate::domain::DomainError;

const MEMBER_COLUMNS: &str = "id, team_id, name, email, phone, role, created_at";

/// PostgreSQL implementation of MemberRepository
#[derive(Debug, Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM members WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get member: {}", e)))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn create(&self, member: Member) -> Result<Member, DomainError> {
        insert_member(&self.pool, &member).await?;
        Ok(member)
    }

    async fn delete(&self, id: &MemberId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete member: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members WHERE team_id = $1 ORDER BY created_at, id",
            MEMBER_COLUMNS
        ))
        .bind(team_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list members: {}", e)))?;

        rows.iter().map(row_to_member).collect()
    }

    async fn count_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE team_id = $1")
            .bind(team_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count members: {}", e)))?;

        Ok(count as usize)
    }

    async fn find_by_team_and_email(
        &self,
        team_id: &TeamId,
        email: &Email,
    ) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM members WHERE team_id = $1 AND email = $2 LIMIT 1",
            MEMBER_COLUMNS
        ))
        .bind(team_id.as_str())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find member: {}", e)))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE team_id = $1")
            .bind(team_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete members: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}

/// Insert a member row; usable inside a transaction
pub(crate) async fn insert_member<'e, E>(executor: E, member: &Member) -> Result<(), DomainError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO members (id, team_id, name, email, phone, role, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(member.id().as_str())
    .bind(member.team_id().as_str())
    .bind(member.name())
    .bind(member.email().as_str())
    .bind(member.phone().map(PhoneNumber::as_str))
    .bind(member.role())
    .bind(member.created_at())
    .execute(executor)
    .await
    .map_err(|e| {
        let msg = e.to_string();

        if msg.contains("foreign key") {
            DomainError::not_found("Team not found")
        } else {
            DomainError::storage(format!("Failed to create member: {}", e))
        }
    })?;

    Ok(())
}

fn row_to_member(row: &sqlx::postgres::PgRow) -> Result<Member, DomainError> {
    let id: String = row.get("id");
    let team_id: String = row.get("team_id");
    let email: String = row.get("email");
    let phone: Option<String> = row.get("phone");
    let created_at: DateTime<Utc> = row.get("created_at");

    let id = MemberId::parse(&id)
        .map_err(|e| DomainError::storage(format!("Invalid member ID in database: {}", e)))?;
    let team_id = TeamId::parse(&team_id)
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let email = Email::parse(&email)
        .map_err(|e| DomainError::storage(format!("Invalid member email in database: {}", e)))?;
    let phone = phone
        .map(PhoneNumber::parse)
        .transpose()
        .map_err(|e| DomainError::storage(format!("Invalid member phone in database: {}", e)))?;

    Ok(Member::restore(
        id,
        team_id,
        row.get("name"),
        email,
        phone,
        row.get("role"),
        created_at,
    ))
}
