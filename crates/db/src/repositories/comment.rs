//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment, comment::ContentType};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments on a content item, oldest first (thread order).
    pub async fn find_by_target(
        &self,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::TargetType.eq(target_type))
            .filter(comment::Column::TargetId.eq(target_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments on a content item.
    pub async fn count_by_target(
        &self,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::TargetType.eq(target_type))
            .filter(comment::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let comment = self.find_by_id(id).await?;
        if let Some(c) = comment {
            c.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
