//! Organizational hierarchy repository (branches, regions, groups).

use std::sync::Arc;

use crate::entities::{Branch, Group, Region, branch, group, region};
use koinonia_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Organization repository for database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All branches in display order.
    pub async fn find_branches(&self) -> AppResult<Vec<branch::Model>> {
        Branch::find()
            .order_by_asc(branch::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a branch by ID.
    pub async fn find_branch(&self, id: &str) -> AppResult<Option<branch::Model>> {
        Branch::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Regions under a branch, in display order.
    pub async fn find_regions(&self, branch_id: &str) -> AppResult<Vec<region::Model>> {
        Region::find()
            .filter(region::Column::BranchId.eq(branch_id))
            .order_by_asc(region::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a region by ID.
    pub async fn find_region(&self, id: &str) -> AppResult<Option<region::Model>> {
        Region::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Groups under a region, in display order.
    pub async fn find_groups(&self, region_id: &str) -> AppResult<Vec<group::Model>> {
        Group::find()
            .filter(group::Column::RegionId.eq(region_id))
            .order_by_asc(group::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a group by ID.
    pub async fn find_group(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
