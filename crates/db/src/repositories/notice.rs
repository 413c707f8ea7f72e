//! Notice repository.

use std::sync::Arc;

use crate::entities::{Comment, Like, Notice, comment, comment::ContentType, like, notice};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Notice repository for database operations.
#[derive(Clone)]
pub struct NoticeRepository {
    db: Arc<DatabaseConnection>,
}

impl NoticeRepository {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notice by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notice::Model>> {
        Notice::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a notice by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<notice::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notice {id}")))
    }

    /// Create a new notice.
    pub async fn create(&self, model: notice::ActiveModel) -> AppResult<notice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a notice.
    pub async fn update(&self, model: notice::ActiveModel) -> AppResult<notice::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of notices: pinned first, then newest first.
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .order_by_desc(notice::Column::IsPinned)
            .order_by_desc(notice::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all notices.
    pub async fn count(&self) -> AppResult<u64> {
        Notice::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a notice together with its comments and likes.
    ///
    /// The three deletes are atomic; notification rows referencing the
    /// notice are left alone (they are owned by their recipients).
    pub async fn delete_with_dependents(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Comment::delete_many()
            .filter(comment::Column::TargetType.eq(ContentType::Notice))
            .filter(comment::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Like::delete_many()
            .filter(like::Column::TargetType.eq(ContentType::Notice))
            .filter(like::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Notice::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
