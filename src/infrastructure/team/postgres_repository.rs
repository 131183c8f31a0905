//! PostgreSQL team repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::team::{Team, TeamQuery, TeamRepository};
use crate::domain::DomainError;

const TEAM_COLUMNS: &str =
    "id, name, leader_name, leader_email, description, max_members, created_at, updated_at";

/// PostgreSQL implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM teams WHERE {} = $1",
            TEAM_COLUMNS, condition
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.fetch_one_where("id", id.as_str()).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        self.fetch_one_where("name", name).await
    }

    async fn find_by_leader_email(&self, email: &Email) -> Result<Option<Team>, DomainError> {
        self.fetch_one_where("leader_email", email.as_str()).await
    }

    async fn create(&self, team: Team) -> Result<Team, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO teams (id, name, leader_name, leader_email, description,
                               max_members, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(team.id().as_str())
        .bind(team.name())
        .bind(team.leader_name())
        .bind(team.leader_email().as_str())
        .bind(team.description())
        .bind(team.max_members() as i32)
        .bind(team.created_at())
        .bind(team.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &team, "create"))?;

        Ok(team)
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE teams
            SET name = $2, description = $3, max_members = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(team.id().as_str())
        .bind(team.name())
        .bind(team.description())
        .bind(team.max_members() as i32)
        .bind(team.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &team, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Team not found"));
        }

        Ok(team)
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete team: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM teams ORDER BY created_at, id OFFSET $1 LIMIT $2",
            TEAM_COLUMNS
        ))
        .bind(sql_bigint(query.skip))
        .bind(sql_bigint(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list teams: {}", e)))?;

        rows.iter().map(row_to_team).collect()
    }
}

/// Postgres BIGINT for a count, saturating instead of wrapping negative
fn sql_bigint(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn unique_violation(e: sqlx::Error, team: &Team, action: &str) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        if msg.contains("leader_email") {
            DomainError::conflict("This email is already registered as a team leader")
        } else if msg.contains("name") {
            DomainError::conflict("Team name already exists")
        } else {
            DomainError::conflict(format!("Team '{}' already exists", team.id()))
        }
    } else {
        DomainError::storage(format!("Failed to {} team: {}", action, e))
    }
}

fn row_to_team(row: &sqlx::postgres::PgRow) -> Result<Team, DomainError> {
    let id: String = row.get("id");
    let leader_email: String = row.get("leader_email");
    let max_members: i32 = row.get("max_members");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let id = TeamId::parse(&id)
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let leader_email = Email::parse(&leader_email)
        .map_err(|e| DomainError::storage(format!("Invalid leader email in database: {}", e)))?;

    Ok(Team::restore(
        id,
        row.get("name"),
        row.get("leader_name"),
        leader_email,
        row.get("description"),
        max_members.max(0) as u32,
        created_at,
        updated_at,
    ))
}
