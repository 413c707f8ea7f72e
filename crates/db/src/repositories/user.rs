//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by normalized phone number.
    ///
    /// Callers must normalize first; this queries the stored digits-only
    /// value verbatim.
    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Phone.eq(phone))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users (paginated, newest first).
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every user holding a push token (broadcast recipient pool).
    ///
    /// Token-shape filtering happens in the fan-out pipeline; this only
    /// excludes NULL and empty strings.
    pub async fn find_push_recipients(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::PushToken.is_not_null())
            .filter(user::Column::PushToken.ne(""))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Clear a user's stored push token (provider reported it dead).
    pub async fn clear_push_token(&self, user_id: &str) -> AppResult<()> {
        let user = self.find_by_id(user_id).await?;
        if let Some(u) = user {
            let mut active: user::ActiveModel = u.into();
            active.push_token = Set(None);
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, phone: &str, name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            phone: phone.to_string(),
            password: "$argon2id$stub".to_string(),
            name: name.to_string(),
            email: None,
            birthday: None,
            gender: None,
            school: None,
            grade: None,
            branch_id: None,
            region_id: None,
            group_id: None,
            push_token: None,
            authority: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_phone() {
        let user = create_test_user("usr1", "01012345678", "김하늘");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.find_by_phone("01012345678").await.unwrap();

        assert_eq!(found.unwrap().id, "usr1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
