//! User-authority assignment repository.

use std::sync::Arc;

use crate::entities::{Authority, UserAuthority, authority, user_authority};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// User-authority repository for database operations.
#[derive(Clone)]
pub struct UserAuthorityRepository {
    db: Arc<DatabaseConnection>,
}

impl UserAuthorityRepository {
    /// Create a new user-authority repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Active assignments for a user, joined to their authority rows,
    /// most senior (lowest level) first.
    pub async fn find_active_with_authority(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<(user_authority::Model, Option<authority::Model>)>> {
        UserAuthority::find()
            .filter(user_authority::Column::UserId.eq(user_id))
            .filter(user_authority::Column::IsActive.eq(true))
            .find_also_related(Authority)
            .order_by_asc(authority::Column::Level)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the assignment row for a (user, authority) pair, active or not.
    ///
    /// At most one row exists per pair; `add` reactivates instead of
    /// inserting a duplicate.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        authority_id: &str,
    ) -> AppResult<Option<user_authority::Model>> {
        UserAuthority::find()
            .filter(user_authority::Column::UserId.eq(user_id))
            .filter(user_authority::Column::AuthorityId.eq(authority_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new assignment.
    pub async fn create(
        &self,
        model: user_authority::ActiveModel,
    ) -> AppResult<user_authority::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an assignment.
    pub async fn update(
        &self,
        model: user_authority::ActiveModel,
    ) -> AppResult<user_authority::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_assignment(id: &str, user_id: &str, authority_id: &str) -> user_authority::Model {
        user_authority::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            authority_id: authority_id.to_string(),
            is_active: true,
            assigned_by: Some("usr_admin".to_string()),
            assigned_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_pair() {
        let assignment = create_test_assignment("ua1", "usr1", "auth_leader");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[assignment.clone()]])
                .into_connection(),
        );

        let repo = UserAuthorityRepository::new(db);
        let found = repo.find_by_pair("usr1", "auth_leader").await.unwrap();

        assert!(found.is_some());
        assert!(found.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_find_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_authority::Model>::new()])
                .into_connection(),
        );

        let repo = UserAuthorityRepository::new(db);
        let found = repo.find_by_pair("usr1", "auth_master").await.unwrap();

        assert!(found.is_none());
    }
}
