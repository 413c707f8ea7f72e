//! Testimony repository.

use std::sync::Arc;

use crate::entities::{Comment, Like, Testimony, comment, comment::ContentType, like, testimony};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Testimony repository for database operations.
#[derive(Clone)]
pub struct TestimonyRepository {
    db: Arc<DatabaseConnection>,
}

impl TestimonyRepository {
    /// Create a new testimony repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a testimony by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<testimony::Model>> {
        Testimony::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a testimony by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<testimony::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("testimony {id}")))
    }

    /// Create a new testimony.
    pub async fn create(&self, model: testimony::ActiveModel) -> AppResult<testimony::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a testimony.
    pub async fn update(&self, model: testimony::ActiveModel) -> AppResult<testimony::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of testimonies, newest first.
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<testimony::Model>> {
        Testimony::find()
            .order_by_desc(testimony::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of one author's testimonies, newest first.
    pub async fn find_page_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<testimony::Model>> {
        Testimony::find()
            .filter(testimony::Column::AuthorId.eq(author_id))
            .order_by_desc(testimony::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all testimonies.
    pub async fn count(&self) -> AppResult<u64> {
        Testimony::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a testimony together with its comments and likes, atomically.
    pub async fn delete_with_dependents(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Comment::delete_many()
            .filter(comment::Column::TargetType.eq(ContentType::Testimony))
            .filter(comment::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Like::delete_many()
            .filter(like::Column::TargetType.eq(ContentType::Testimony))
            .filter(like::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Testimony::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
