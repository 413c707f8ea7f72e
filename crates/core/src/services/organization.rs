//! Organization service.
//!
//! Read side of the branch → region → group hierarchy. Placement of a
//! user inside the hierarchy is handled by the user service.

use koinonia_common::{AppError, AppResult};
use koinonia_db::{
    entities::{branch, group, region},
    repositories::OrganizationRepository,
};
use serde::Serialize;

/// A branch with its regions and their groups.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchTree {
    pub id: String,
    pub name: String,
    pub regions: Vec<RegionTree>,
}

/// A region with its groups.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTree {
    pub id: String,
    pub name: String,
    pub groups: Vec<GroupNode>,
}

/// A leaf group.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub id: String,
    pub name: String,
}

/// Organization service for business logic.
#[derive(Clone)]
pub struct OrganizationService {
    organization_repo: OrganizationRepository,
}

impl OrganizationService {
    /// Create a new organization service.
    #[must_use]
    pub const fn new(organization_repo: OrganizationRepository) -> Self {
        Self { organization_repo }
    }

    /// All branches in display order.
    pub async fn list_branches(&self) -> AppResult<Vec<branch::Model>> {
        self.organization_repo.find_branches().await
    }

    /// Regions under a branch.
    pub async fn list_regions(&self, branch_id: &str) -> AppResult<Vec<region::Model>> {
        self.organization_repo
            .find_branch(branch_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("branch {branch_id}")))?;
        self.organization_repo.find_regions(branch_id).await
    }

    /// Groups under a region.
    pub async fn list_groups(&self, region_id: &str) -> AppResult<Vec<group::Model>> {
        self.organization_repo
            .find_region(region_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("region {region_id}")))?;
        self.organization_repo.find_groups(region_id).await
    }

    /// The whole hierarchy in one tree (the client's placement picker).
    pub async fn tree(&self) -> AppResult<Vec<BranchTree>> {
        let branches = self.organization_repo.find_branches().await?;

        let mut tree = Vec::with_capacity(branches.len());
        for branch in branches {
            let regions = self.organization_repo.find_regions(&branch.id).await?;

            let mut region_nodes = Vec::with_capacity(regions.len());
            for region in regions {
                let groups = self.organization_repo.find_groups(&region.id).await?;
                region_nodes.push(RegionTree {
                    id: region.id,
                    name: region.name,
                    groups: groups
                        .into_iter()
                        .map(|g| GroupNode {
                            id: g.id,
                            name: g.name,
                        })
                        .collect(),
                });
            }

            tree.push(BranchTree {
                id: branch.id,
                name: branch.name,
                regions: region_nodes,
            });
        }

        Ok(tree)
    }
}
