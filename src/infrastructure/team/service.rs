//! Team service for team and roster management

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::{MemberId, TeamId};
use crate::domain::invitation::InvitationRepository;
use crate::domain::member::{Member, MemberRepository};
use crate::domain::team::{Team, TeamQuery, TeamRepository};
use crate::domain::DomainError;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub leader_name: String,
    pub leader_email: Email,
    pub description: Option<String>,
    pub max_members: u32,
}

/// Request for updating a team; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<u32>,
}

/// Request for adding a member directly, without an invitation
#[derive(Debug, Clone)]
pub struct NewMemberRequest {
    pub name: String,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub role: Option<String>,
}

/// A team together with its current members
#[derive(Debug, Clone)]
pub struct TeamRoster {
    pub team: Team,
    pub members: Vec<Member>,
}

pub(crate) fn team_not_found() -> DomainError {
    DomainError::not_found("Team not found")
}

pub(crate) fn team_full(max_members: u32) -> DomainError {
    DomainError::conflict(format!("Team is full (max {} members)", max_members))
}

/// Team service for managing teams and their members
#[derive(Debug)]
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    members: Arc<dyn MemberRepository>,
    invitations: Arc<dyn InvitationRepository>,
}

impl TeamService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        members: Arc<dyn MemberRepository>,
        invitations: Arc<dyn InvitationRepository>,
    ) -> Self {
        Self {
            teams,
            members,
            invitations,
        }
    }

    /// Create a new team
    pub async fn create(&self, request: CreateTeamRequest) -> Result<TeamRoster, DomainError> {
        info!(name = %request.name, leader = %request.leader_email, "Creating team");

        let mut team = Team::new(
            request.name,
            request.leader_name,
            request.leader_email,
            request.max_members,
        )?;

        if let Some(description) = request.description {
            team = team.with_description(description);
        }

        if self.teams.find_by_name(team.name()).await?.is_some() {
            return Err(DomainError::conflict("Team name already exists"));
        }

        if self
            .teams
            .find_by_leader_email(team.leader_email())
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "This email is already registered as a team leader",
            ));
        }

        let team = self.teams.create(team).await?;

        Ok(TeamRoster {
            team,
            members: Vec::new(),
        })
    }

    /// List teams in creation order with their members
    pub async fn list(&self, query: &TeamQuery) -> Result<Vec<TeamRoster>, DomainError> {
        let teams = self.teams.list(query).await?;
        let mut rosters = Vec::with_capacity(teams.len());

        for team in teams {
            let members = self.members.list_by_team(team.id()).await?;
            rosters.push(TeamRoster { team, members });
        }

        Ok(rosters)
    }

    /// Get a team with its members
    pub async fn get(&self, id: &TeamId) -> Result<TeamRoster, DomainError> {
        let team = self.require_team(id).await?;
        let members = self.members.list_by_team(id).await?;

        Ok(TeamRoster { team, members })
    }

    /// Update name, description or capacity
    pub async fn update(
        &self,
        id: &TeamId,
        request: UpdateTeamRequest,
    ) -> Result<TeamRoster, DomainError> {
        info!(id = %id, "Updating team");

        let mut team = self.require_team(id).await?;

        if let Some(name) = request.name {
            let name = name.trim();

            if let Some(other) = self.teams.find_by_name(name).await? {
                if other.id() != id {
                    return Err(DomainError::conflict("Team name already exists"));
                }
            }

            team.set_name(name)?;
        }

        if let Some(description) = request.description {
            team.set_description(Some(description));
        }

        if let Some(max_members) = request.max_members {
            let current = self.members.count_by_team(id).await?;

            if (max_members as usize) < current {
                return Err(DomainError::conflict(format!(
                    "Team already has {} members; max_members cannot be lower",
                    current
                )));
            }

            team.set_max_members(max_members)?;
        }

        let team = self.teams.update(team).await?;
        let members = self.members.list_by_team(id).await?;

        Ok(TeamRoster { team, members })
    }

    /// Delete a team together with its members and invitations
    pub async fn delete(&self, id: &TeamId) -> Result<(), DomainError> {
        info!(id = %id, "Deleting team");

        self.require_team(id).await?;

        let invitations = self.invitations.delete_by_team(id).await?;
        let members = self.members.delete_by_team(id).await?;
        self.teams.delete(id).await?;

        debug!(id = %id, members, invitations, "Team deleted");
        Ok(())
    }

    /// Add a member directly
    pub async fn add_member(
        &self,
        team_id: &TeamId,
        request: NewMemberRequest,
    ) -> Result<Member, DomainError> {
        info!(team_id = %team_id, email = %request.email, "Adding team member");

        let team = self.require_team(team_id).await?;

        let current = self.members.count_by_team(team_id).await?;
        if !team.has_room_for_one_more(current) {
            return Err(team_full(team.max_members()));
        }

        if self
            .members
            .find_by_team_and_email(team_id, &request.email)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "Member with this email already exists in the team",
            ));
        }

        let member = Member::new(
            team_id.clone(),
            request.name,
            request.email,
            request.phone,
            request.role,
        )?;

        self.members.create(member).await
    }

    /// Members of a team in join order
    pub async fn list_members(&self, team_id: &TeamId) -> Result<Vec<Member>, DomainError> {
        self.require_team(team_id).await?;
        self.members.list_by_team(team_id).await
    }

    /// Remove a member; the member must belong to `team_id`
    pub async fn remove_member(
        &self,
        team_id: &TeamId,
        member_id: &MemberId,
    ) -> Result<(), DomainError> {
        info!(team_id = %team_id, member_id = %member_id, "Removing team member");

        let not_in_team = || DomainError::not_found("Member not found in this team");

        let member = self
            .members
            .get(member_id)
            .await?
            .filter(|m| m.team_id() == team_id)
            .ok_or_else(not_in_team)?;

        if !self.members.delete(member.id()).await? {
            return Err(not_in_team());
        }

        Ok(())
    }

    /// Check the storage backend answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.teams
            .list(&TeamQuery::new().with_limit(1))
            .await
            .map(|_| ())
    }

    async fn require_team(&self, id: &TeamId) -> Result<Team, DomainError> {
        self.teams.get(id).await?.ok_or_else(team_not_found)
    }
}
