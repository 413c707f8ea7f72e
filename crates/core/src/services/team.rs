//! Team service.

use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::{team, team_member},
    repositories::{TeamRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a team.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    pub description: Option<String>,

    pub leader_id: Option<String>,
}

/// A team member with display fields resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberView {
    pub user_id: String,
    pub name: String,
    pub joined_at: String,
}

/// A team with its members.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<String>,
    pub members: Vec<TeamMemberView>,
}

/// Team service for business logic.
#[derive(Clone)]
pub struct TeamService {
    team_repo: TeamRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl TeamService {
    /// Create a new team service.
    #[must_use]
    pub const fn new(team_repo: TeamRepository, user_repo: UserRepository) -> Self {
        Self {
            team_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a team. The leader, when given, must exist and becomes the
    /// first member.
    pub async fn create(&self, input: CreateTeamInput) -> AppResult<team::Model> {
        input.validate()?;

        if let Some(leader_id) = &input.leader_id {
            self.user_repo.get_by_id(leader_id).await?;
        }

        let model = team::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            description: Set(input.description),
            leader_id: Set(input.leader_id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let team = self.team_repo.create(model).await?;

        if let Some(leader_id) = input.leader_id {
            self.add_member(&team.id, &leader_id).await?;
        }

        Ok(team)
    }

    /// All teams.
    pub async fn list(&self) -> AppResult<Vec<team::Model>> {
        self.team_repo.find_all().await
    }

    /// A team with its membership roster.
    pub async fn get(&self, id: &str) -> AppResult<TeamView> {
        let team = self.team_repo.get_by_id(id).await?;
        let memberships = self.team_repo.find_members(id).await?;

        let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.clone()).collect();
        let users = self.user_repo.find_by_ids(&user_ids).await?;

        let members = memberships
            .into_iter()
            .map(|m| {
                let name = users
                    .iter()
                    .find(|u| u.id == m.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default();
                TeamMemberView {
                    user_id: m.user_id,
                    name,
                    joined_at: m.joined_at.to_rfc3339(),
                }
            })
            .collect();

        Ok(TeamView {
            id: team.id,
            name: team.name,
            description: team.description,
            leader_id: team.leader_id,
            members,
        })
    }

    /// Add a member. Adding an existing member is a no-op success.
    pub async fn add_member(&self, team_id: &str, user_id: &str) -> AppResult<()> {
        self.team_repo.get_by_id(team_id).await?;
        self.user_repo.get_by_id(user_id).await?;

        if self.team_repo.find_member(team_id, user_id).await?.is_some() {
            return Ok(());
        }

        let model = team_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            team_id: Set(team_id.to_string()),
            user_id: Set(user_id.to_string()),
            joined_at: Set(chrono::Utc::now().into()),
        };
        self.team_repo.add_member(model).await?;
        Ok(())
    }

    /// Remove a member. Removing a non-member is a no-op success.
    pub async fn remove_member(&self, team_id: &str, user_id: &str) -> AppResult<()> {
        self.team_repo.get_by_id(team_id).await?;
        self.team_repo.remove_member(team_id, user_id).await
    }

    /// Teams a user belongs to.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<team::Model>> {
        let memberships = self.team_repo.find_memberships_for_user(user_id).await?;

        let mut teams = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(team) = self.team_repo.find_by_id(&membership.team_id).await? {
                teams.push(team);
            }
        }
        Ok(teams)
    }

    /// Delete a team and its memberships.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.team_repo.get_by_id(id).await?;
        self.team_repo.delete_with_members(id).await
    }
}
