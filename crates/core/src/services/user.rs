//! User service.

use chrono::NaiveDate;
use koinonia_common::{AppError, AppResult, IdGenerator, normalize_phone};
use koinonia_db::{
    entities::user,
    repositories::{OrganizationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::auth::hash_password;
use crate::services::push::is_valid_push_token;

/// Input for registering a new member ("join").
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    /// Any client-side format; normalized to digits before storage.
    #[validate(length(min = 9, max = 20))]
    pub phone: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: Option<String>,

    pub birthday: Option<NaiveDate>,

    #[validate(length(max = 16))]
    pub gender: Option<String>,

    #[validate(length(max = 128))]
    pub school: Option<String>,

    #[validate(length(max = 32))]
    pub grade: Option<String>,
}

/// Sparse profile patch: only present fields are applied.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub birthday: Option<NaiveDate>,

    #[validate(length(max = 16))]
    pub gender: Option<String>,

    #[validate(length(max = 128))]
    pub school: Option<String>,

    #[validate(length(max = 32))]
    pub grade: Option<String>,
}

/// Organizational placement assignment.
#[derive(Debug, Deserialize)]
pub struct PlacementInput {
    pub branch_id: Option<String>,
    pub region_id: Option<String>,
    pub group_id: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    organization_repo: OrganizationRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, organization_repo: OrganizationRepository) -> Self {
        Self {
            user_repo,
            organization_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new member.
    pub async fn join(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let phone = normalize_phone(&input.phone);
        if phone.is_empty() {
            return Err(AppError::Validation(
                "phone must contain digits".to_string(),
            ));
        }

        if self.user_repo.find_by_phone(&phone).await?.is_some() {
            return Err(AppError::Conflict(
                "phone number already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            phone: Set(phone),
            password: Set(password_hash),
            name: Set(input.name),
            email: Set(input.email),
            birthday: Set(input.birthday),
            gender: Set(input.gender),
            school: Set(input.school),
            grade: Set(input.grade),
            branch_id: Set(None),
            region_id: Set(None),
            group_id: Set(None),
            push_token: Set(None),
            authority: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Apply a sparse profile patch.
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(birthday) = input.birthday {
            active.birthday = Set(Some(birthday));
        }
        if let Some(gender) = input.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(school) = input.school {
            active.school = Set(Some(school));
        }
        if let Some(grade) = input.grade {
            active.grade = Set(Some(grade));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Assign a user's organizational placement.
    ///
    /// Referenced branch/region/group rows must exist; placement ids are
    /// validated before any write.
    pub async fn assign_placement(
        &self,
        id: &str,
        input: PlacementInput,
    ) -> AppResult<user::Model> {
        if let Some(branch_id) = &input.branch_id
            && self.organization_repo.find_branch(branch_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("branch {branch_id}")));
        }
        if let Some(region_id) = &input.region_id
            && self.organization_repo.find_region(region_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("region {region_id}")));
        }
        if let Some(group_id) = &input.group_id
            && self.organization_repo.find_group(group_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("group {group_id}")));
        }

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if input.branch_id.is_some() {
            active.branch_id = Set(input.branch_id);
        }
        if input.region_id.is_some() {
            active.region_id = Set(input.region_id);
        }
        if input.group_id.is_some() {
            active.group_id = Set(input.group_id);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Store a device push token after a shape check.
    ///
    /// `None` clears the token (logout / push opt-out).
    pub async fn update_push_token(
        &self,
        id: &str,
        token: Option<String>,
    ) -> AppResult<user::Model> {
        if let Some(token) = &token
            && !is_valid_push_token(token)
        {
            return Err(AppError::Validation("malformed push token".to_string()));
        }

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();
        active.push_token = Set(token);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Member directory page (for managers).
    pub async fn list(&self, page: u64, page_size: u64) -> AppResult<(Vec<user::Model>, u64)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let users = self
            .user_repo
            .find_page(page_size, (page - 1) * page_size)
            .await?;
        let total = self.user_repo.count().await?;

        Ok((users, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> UserService {
        let db = Arc::new(db);
        UserService::new(
            UserRepository::new(Arc::clone(&db)),
            OrganizationRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_join_rejects_digitless_phone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .join(CreateUserInput {
                phone: "no-digits-here".to_string(),
                password: "password123".to_string(),
                name: "김하늘".to_string(),
                email: None,
                birthday: None,
                gender: None,
                school: None,
                grade: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_push_token_rejects_malformed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .update_push_token("usr1", Some("null".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
