//! Team repository.

use std::sync::Arc;

use crate::entities::{Team, TeamMember, team, team_member};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

/// Team repository for database operations.
#[derive(Clone)]
pub struct TeamRepository {
    db: Arc<DatabaseConnection>,
}

impl TeamRepository {
    /// Create a new team repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a team by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<team::Model>> {
        Team::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a team by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<team::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team {id}")))
    }

    /// Create a new team.
    pub async fn create(&self, model: team::ActiveModel) -> AppResult<team::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a team.
    pub async fn update(&self, model: team::ActiveModel) -> AppResult<team::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All teams, alphabetical.
    pub async fn find_all(&self) -> AppResult<Vec<team::Model>> {
        Team::find()
            .order_by_asc(team::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a team and its memberships, atomically.
    pub async fn delete_with_members(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TeamMember::delete_many()
            .filter(team_member::Column::TeamId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Team::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Membership ===

    /// Find a membership row.
    pub async fn find_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> AppResult<Option<team_member::Model>> {
        TeamMember::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .filter(team_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All memberships of a team, oldest join first.
    pub async fn find_members(&self, team_id: &str) -> AppResult<Vec<team_member::Model>> {
        TeamMember::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .order_by_asc(team_member::Column::JoinedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All of a user's team memberships.
    pub async fn find_memberships_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<team_member::Model>> {
        TeamMember::find()
            .filter(team_member::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a membership row.
    pub async fn add_member(
        &self,
        model: team_member::ActiveModel,
    ) -> AppResult<team_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a membership. Missing rows are a no-op.
    pub async fn remove_member(&self, team_id: &str, user_id: &str) -> AppResult<()> {
        let member = self.find_member(team_id, user_id).await?;
        if let Some(m) = member {
            m.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
