//! Organization hierarchy endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use koinonia_common::AppResult;
use koinonia_core::BranchTree;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Flat node response (branches, regions, groups all share the shape).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNodeResponse {
    pub id: String,
    pub name: String,
}

/// Whole-hierarchy response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub branches: Vec<BranchTree>,
}

/// The full branch → region → group tree.
async fn tree(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TreeResponse>> {
    let branches = state.organization_service.tree().await?;
    Ok(ApiResponse::ok(TreeResponse { branches }))
}

/// Node list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNodeListResponse {
    pub items: Vec<OrgNodeResponse>,
}

/// All branches.
async fn list_branches(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OrgNodeListResponse>> {
    let branches = state.organization_service.list_branches().await?;
    Ok(ApiResponse::ok(OrgNodeListResponse {
        items: branches
            .into_iter()
            .map(|b| OrgNodeResponse {
                id: b.id,
                name: b.name,
            })
            .collect(),
    }))
}

/// Regions under a branch.
async fn list_regions(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> AppResult<ApiResponse<OrgNodeListResponse>> {
    let regions = state.organization_service.list_regions(&branch_id).await?;
    Ok(ApiResponse::ok(OrgNodeListResponse {
        items: regions
            .into_iter()
            .map(|r| OrgNodeResponse {
                id: r.id,
                name: r.name,
            })
            .collect(),
    }))
}

/// Groups under a region.
async fn list_groups(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(region_id): Path<String>,
) -> AppResult<ApiResponse<OrgNodeListResponse>> {
    let groups = state.organization_service.list_groups(&region_id).await?;
    Ok(ApiResponse::ok(OrgNodeListResponse {
        items: groups
            .into_iter()
            .map(|g| OrgNodeResponse {
                id: g.id,
                name: g.name,
            })
            .collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tree", get(tree))
        .route("/branches", get(list_branches))
        .route("/branches/{branch_id}/regions", get(list_regions))
        .route("/regions/{region_id}/groups", get(list_groups))
}
