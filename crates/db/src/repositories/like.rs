//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, comment::ContentType, like};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and target.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TargetType.eq(target_type))
            .filter(like::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new like.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user's like on a target. Missing rows are a no-op.
    pub async fn delete_by_user_and_target(
        &self,
        user_id: &str,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<()> {
        let like = self
            .find_by_user_and_target(user_id, target_type, target_id)
            .await?;
        if let Some(l) = like {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Count likes on a content item.
    pub async fn count_by_target(
        &self,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::TargetType.eq(target_type))
            .filter(like::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
