//! Refresh token repository.

use std::sync::Arc;

use crate::entities::{RefreshToken, refresh_token};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};

/// Refresh token repository for database operations.
#[derive(Clone)]
pub struct RefreshTokenRepository {
    db: Arc<DatabaseConnection>,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a stored token that has not expired.
    pub async fn find_valid(&self, token: &str) -> AppResult<Option<refresh_token::Model>> {
        RefreshToken::find_by_id(token)
            .filter(refresh_token::Column::ExpiresAt.gt(chrono::Utc::now()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a new token.
    pub async fn create(&self, model: refresh_token::ActiveModel) -> AppResult<refresh_token::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a token (rotation or logout). Missing rows are a no-op.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        let row = RefreshToken::find_by_id(token)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if let Some(r) = row {
            r.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Delete every token belonging to a user (logout-everywhere).
    pub async fn delete_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
