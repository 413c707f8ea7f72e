//! Authority resolution service.
//!
//! Computes a user's effective permission set over the multi-role
//! assignment table and exposes capability predicates to route handlers.
//! The legacy single-role `authority` column on the user row is a
//! write-only display mirror maintained here; it is never read back.

use chrono::{DateTime, FixedOffset, Utc};
use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{authority, user_authority},
    repositories::{AuthorityRepository, UserAuthorityRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Sentinel level for "no privilege at all". Unreachable for existing
/// users as long as the default role exists in the reference data.
pub const NO_AUTHORITY_LEVEL: i32 = 999;

/// Role synthesized for users with zero active assignments.
pub const DEFAULT_AUTHORITY_NAME: &str = "LEADER";

/// Fallback shown when an assignment references a missing authority row.
const UNKNOWN_DISPLAY_NAME: &str = "알 수 없음";

/// The two most senior roles; holding either grants master capability.
const MASTER_AUTHORITY_NAMES: [&str; 2] = ["MASTER", "GENERAL_DIRECTOR"];

/// Team-leader-or-above may manage users.
pub const MANAGE_USERS_LEVEL: i32 = 5;

/// Branch-director-or-above may manage training.
pub const MANAGE_TRAINING_LEVEL: i32 = 2;

/// One resolved role, with every field defensively defaulted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAuthority {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub display_name: String,
    pub level: i32,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl ResolvedAuthority {
    /// Build from a joined assignment row. An assignment whose authority
    /// row is missing (dangling reference data) still produces a concrete
    /// entry: fallback display name, sentinel level. Consumers never see
    /// null fields.
    fn from_joined(
        assignment: &user_authority::Model,
        authority: Option<authority::Model>,
    ) -> Self {
        authority.map_or_else(
            || Self {
                id: assignment.authority_id.clone(),
                category_id: String::new(),
                name: String::new(),
                display_name: UNKNOWN_DISPLAY_NAME.to_string(),
                level: NO_AUTHORITY_LEVEL,
                is_active: assignment.is_active,
                created_at: Utc::now().into(),
            },
            |a| Self {
                id: a.id,
                category_id: a.category_id,
                name: a.name,
                display_name: a.display_name,
                level: a.level,
                is_active: assignment.is_active,
                created_at: a.created_at,
            },
        )
    }

    fn from_default(authority: authority::Model) -> Self {
        Self {
            id: authority.id,
            category_id: authority.category_id,
            name: authority.name,
            display_name: authority.display_name,
            level: authority.level,
            is_active: true,
            created_at: authority.created_at,
        }
    }
}

/// A user's resolved set of active roles, most senior first.
///
/// Never empty for an existing user: resolution falls back to the
/// system default role when no assignment is active.
#[derive(Debug, Clone)]
pub struct ResolvedAuthoritySet {
    pub user_id: String,
    pub user_name: String,
    pub authorities: Vec<ResolvedAuthority>,
}

impl ResolvedAuthoritySet {
    /// Minimum level present, or the sentinel when the set is empty.
    #[must_use]
    pub fn highest_authority_level(&self) -> i32 {
        self.authorities
            .iter()
            .map(|a| a.level)
            .min()
            .unwrap_or(NO_AUTHORITY_LEVEL)
    }

    /// Joined display string, e.g. `지부장, 팀장`.
    #[must_use]
    pub fn display_names(&self) -> String {
        self.authorities
            .iter()
            .map(|a| a.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True iff any active entry's role name matches.
    #[must_use]
    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a.name == name)
    }

    /// "At least as senior as": lower numeric level = more privilege.
    #[must_use]
    pub fn can_access_by_level(&self, required_level: i32) -> bool {
        self.highest_authority_level() <= required_level
    }

    /// True iff the set contains one of the two most senior roles.
    #[must_use]
    pub fn is_master(&self) -> bool {
        MASTER_AUTHORITY_NAMES
            .iter()
            .any(|name| self.has_authority(name))
    }

    /// Team-leader-or-above.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.can_access_by_level(MANAGE_USERS_LEVEL)
    }

    /// Branch-director-or-above.
    #[must_use]
    pub fn can_manage_training(&self) -> bool {
        self.can_access_by_level(MANAGE_TRAINING_LEVEL)
    }

    /// External representation sent across the API boundary.
    #[must_use]
    pub fn to_profile(&self) -> AuthorityProfile {
        AuthorityProfile {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            highest_authority_level: self.highest_authority_level(),
            authority_display_names: self.display_names(),
            // Legacy single-role field mirrors the most senior display name
            authority: self
                .authorities
                .first()
                .map(|a| a.display_name.clone())
                .unwrap_or_default(),
            authorities: self.authorities.clone(),
        }
    }
}

/// Wire form of a resolved authority set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityProfile {
    pub user_id: String,
    pub user_name: String,
    pub authorities: Vec<ResolvedAuthority>,
    pub highest_authority_level: i32,
    pub authority_display_names: String,
    pub authority: String,
}

/// Authority resolution service.
#[derive(Clone)]
pub struct AuthorityService {
    user_repo: UserRepository,
    authority_repo: AuthorityRepository,
    user_authority_repo: UserAuthorityRepository,
    id_gen: IdGenerator,
}

impl AuthorityService {
    /// Create a new authority service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        authority_repo: AuthorityRepository,
        user_authority_repo: UserAuthorityRepository,
    ) -> Self {
        Self {
            user_repo,
            authority_repo,
            user_authority_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a user's active roles.
    ///
    /// Missing users are an error, distinct from "found, zero roles":
    /// the latter synthesizes the default role so the returned set is
    /// never empty for an existing user.
    pub async fn resolve(&self, user_id: &str) -> AppResult<ResolvedAuthoritySet> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let rows = self
            .user_authority_repo
            .find_active_with_authority(user_id)
            .await?;

        let mut authorities: Vec<ResolvedAuthority> = rows
            .iter()
            .map(|(assignment, authority)| {
                ResolvedAuthority::from_joined(assignment, authority.clone())
            })
            .collect();

        if authorities.is_empty() {
            match self.authority_repo.find_by_name(DEFAULT_AUTHORITY_NAME).await? {
                Some(default) => authorities.push(ResolvedAuthority::from_default(default)),
                None => {
                    // Only reachable when the reference-data table was not
                    // seeded; the set stays empty and the sentinel shows.
                    tracing::warn!(
                        user_id = %user_id,
                        default = DEFAULT_AUTHORITY_NAME,
                        "Default authority missing from reference data"
                    );
                }
            }
        }

        Ok(ResolvedAuthoritySet {
            user_id: user.id,
            user_name: user.name,
            authorities,
        })
    }

    /// The full role catalogue, most senior first.
    pub async fn catalogue(&self) -> AppResult<Vec<authority::Model>> {
        self.authority_repo.find_all().await
    }

    /// Ensure an active assignment exists for (user, authority).
    ///
    /// Idempotent: a prior row for the pair (active or not) is
    /// reactivated with fresh assignment metadata instead of duplicated.
    pub async fn add_authority(
        &self,
        user_id: &str,
        authority_id: &str,
        assigned_by: &str,
    ) -> AppResult<()> {
        // Both sides must exist before touching the join table
        self.user_repo.get_by_id(user_id).await?;
        self.authority_repo.get_by_id(authority_id).await?;

        let now = Utc::now();
        match self
            .user_authority_repo
            .find_by_pair(user_id, authority_id)
            .await?
        {
            Some(existing) => {
                let mut active: user_authority::ActiveModel = existing.into();
                active.is_active = Set(true);
                active.assigned_by = Set(Some(assigned_by.to_string()));
                active.assigned_at = Set(now.into());
                active.updated_at = Set(Some(now.into()));
                self.user_authority_repo.update(active).await?;
            }
            None => {
                let model = user_authority::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    authority_id: Set(authority_id.to_string()),
                    is_active: Set(true),
                    assigned_by: Set(Some(assigned_by.to_string())),
                    assigned_at: Set(now.into()),
                    updated_at: Set(None),
                };
                self.user_authority_repo.create(model).await?;
            }
        }

        self.sync_legacy_authority(user_id).await
    }

    /// Soft-deactivate the matching assignment.
    ///
    /// Removal is declarative: deactivating a pair that was never
    /// assigned (or is already inactive) is a no-op success.
    pub async fn remove_authority(&self, user_id: &str, authority_id: &str) -> AppResult<()> {
        let Some(existing) = self
            .user_authority_repo
            .find_by_pair(user_id, authority_id)
            .await?
        else {
            return Ok(());
        };

        if existing.is_active {
            let mut active: user_authority::ActiveModel = existing.into();
            active.is_active = Set(false);
            active.updated_at = Set(Some(Utc::now().into()));
            self.user_authority_repo.update(active).await?;
        }

        self.sync_legacy_authority(user_id).await
    }

    /// Refresh the write-only legacy `authority` column from the
    /// resolved set's most senior display name.
    async fn sync_legacy_authority(&self, user_id: &str) -> AppResult<()> {
        let resolved = self.resolve(user_id).await?;
        let legacy = resolved.authorities.first().map(|a| a.display_name.clone());

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: koinonia_db::entities::user::ActiveModel = user.into();
        active.authority = Set(legacy);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use koinonia_db::entities::user;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn authority_model(id: &str, name: &str, display_name: &str, level: i32) -> authority::Model {
        authority::Model {
            id: id.to_string(),
            category_id: "cat_organization".to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            level,
            created_at: Utc::now().into(),
        }
    }

    fn resolved(id: &str, name: &str, display_name: &str, level: i32) -> ResolvedAuthority {
        ResolvedAuthority {
            id: id.to_string(),
            category_id: "cat_organization".to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            level,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn set_of(authorities: Vec<ResolvedAuthority>) -> ResolvedAuthoritySet {
        ResolvedAuthoritySet {
            user_id: "usr1".to_string(),
            user_name: "김하늘".to_string(),
            authorities,
        }
    }

    fn user_model(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            phone: "01012345678".to_string(),
            password: "$argon2id$stub".to_string(),
            name: "김하늘".to_string(),
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

    fn service(db: sea_orm::DatabaseConnection) -> AuthorityService {
        let db = Arc::new(db);
        AuthorityService::new(
            UserRepository::new(Arc::clone(&db)),
            AuthorityRepository::new(Arc::clone(&db)),
            UserAuthorityRepository::new(db),
        )
    }

    #[test]
    fn test_highest_level_is_minimum() {
        let set = set_of(vec![
            resolved("a1", "BRANCH_DIRECTOR", "지부장", 2),
            resolved("a2", "TEAM_LEADER", "팀장", 5),
        ]);
        assert_eq!(set.highest_authority_level(), 2);
    }

    #[test]
    fn test_empty_set_uses_sentinel() {
        let set = set_of(vec![]);
        assert_eq!(set.highest_authority_level(), NO_AUTHORITY_LEVEL);
        assert!(!set.can_manage_users());
    }

    #[test]
    fn test_can_access_by_level_is_monotonic() {
        let set = set_of(vec![resolved("a1", "TEAM_LEADER", "팀장", 5)]);
        assert!(set.can_access_by_level(5));
        // Satisfying level x implies satisfying every level > x
        for level in 6..10 {
            assert!(set.can_access_by_level(level));
        }
        assert!(!set.can_access_by_level(4));
    }

    #[test]
    fn test_master_predicate() {
        let master = set_of(vec![resolved("a1", "MASTER", "총관리자", 0)]);
        let director = set_of(vec![resolved("a2", "GENERAL_DIRECTOR", "총단장", 1)]);
        let leader = set_of(vec![resolved("a3", "LEADER", "리더", 6)]);

        assert!(master.is_master());
        assert!(director.is_master());
        assert!(!leader.is_master());
    }

    #[test]
    fn test_capability_thresholds() {
        let team_leader = set_of(vec![resolved("a1", "TEAM_LEADER", "팀장", 5)]);
        assert!(team_leader.can_manage_users());
        assert!(!team_leader.can_manage_training());

        let branch_director = set_of(vec![resolved("a2", "BRANCH_DIRECTOR", "지부장", 2)]);
        assert!(branch_director.can_manage_users());
        assert!(branch_director.can_manage_training());
    }

    #[test]
    fn test_display_names_joined_in_seniority_order() {
        let set = set_of(vec![
            resolved("a1", "BRANCH_DIRECTOR", "지부장", 2),
            resolved("a2", "TEAM_LEADER", "팀장", 5),
        ]);
        assert_eq!(set.display_names(), "지부장, 팀장");
    }

    #[test]
    fn test_profile_mirrors_most_senior_as_legacy() {
        let set = set_of(vec![
            resolved("a1", "REGION_DIRECTOR", "지역장", 3),
            resolved("a2", "LEADER", "리더", 6),
        ]);
        let profile = set.to_profile();
        assert_eq!(profile.authority, "지역장");
        assert_eq!(profile.highest_authority_level, 3);
        assert_eq!(profile.authorities.len(), 2);
    }

    #[test]
    fn test_dangling_assignment_gets_defensive_defaults() {
        let assignment = user_authority::Model {
            id: "ua1".to_string(),
            user_id: "usr1".to_string(),
            authority_id: "auth_gone".to_string(),
            is_active: true,
            assigned_by: None,
            assigned_at: Utc::now().into(),
            updated_at: None,
        };

        let entry = ResolvedAuthority::from_joined(&assignment, None);

        assert_eq!(entry.display_name, UNKNOWN_DISPLAY_NAME);
        assert_eq!(entry.level, NO_AUTHORITY_LEVEL);
        assert!(entry.is_active);
    }

    #[tokio::test]
    async fn test_resolve_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).resolve("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_unassigned_pair_is_noop_success() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // no assignment row for the pair
            .append_query_results([Vec::<user_authority::Model>::new()])
            .into_connection();

        let result = service(db).remove_authority("usr1", "auth_master").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_default_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // user lookup
            .append_query_results([vec![user_model("usr1")]])
            // no active assignments
            .append_query_results([Vec::<(user_authority::Model, authority::Model)>::new()])
            // default role lookup
            .append_query_results([vec![authority_model("auth_leader", "LEADER", "리더", 6)]])
            .into_connection();

        let set = service(db).resolve("usr1").await.unwrap();

        assert_eq!(set.authorities.len(), 1);
        assert_eq!(set.authorities[0].name, "LEADER");
        assert_eq!(set.highest_authority_level(), 6);
    }
}
