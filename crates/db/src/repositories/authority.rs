//! Authority reference-data repository.
//!
//! Authorities and their categories are static reference data seeded by
//! migration; this repository only reads them.

use std::sync::Arc;

use crate::entities::{Authority, AuthorityCategory, authority, authority_category};
use koinonia_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Authority repository for database operations.
#[derive(Clone)]
pub struct AuthorityRepository {
    db: Arc<DatabaseConnection>,
}

impl AuthorityRepository {
    /// Create a new authority repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an authority by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<authority::Model>> {
        Authority::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an authority by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<authority::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("authority {id}")))
    }

    /// Find an authority by its symbolic name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<authority::Model>> {
        Authority::find()
            .filter(authority::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All authorities, most senior first.
    pub async fn find_all(&self) -> AppResult<Vec<authority::Model>> {
        Authority::find()
            .order_by_asc(authority::Column::Level)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All categories in display order.
    pub async fn find_categories(&self) -> AppResult<Vec<authority_category::Model>> {
        AuthorityCategory::find()
            .order_by_asc(authority_category::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
