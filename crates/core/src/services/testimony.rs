//! Testimony service.

use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{notification::NotificationType, testimony, user},
    repositories::TestimonyRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::fanout::{ContentEvent, FanoutService, FanoutStatus};

/// Input for sharing a testimony.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestimonyInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,
}

/// Sparse patch for a testimony.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTestimonyInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Testimony service for business logic.
#[derive(Clone)]
pub struct TestimonyService {
    testimony_repo: TestimonyRepository,
    fanout: FanoutService,
    id_gen: IdGenerator,
}

impl TestimonyService {
    /// Create a new testimony service.
    #[must_use]
    pub const fn new(testimony_repo: TestimonyRepository, fanout: FanoutService) -> Self {
        Self {
            testimony_repo,
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    /// Share a testimony and broadcast it to every deliverable member.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateTestimonyInput,
    ) -> AppResult<(testimony::Model, FanoutStatus)> {
        input.validate()?;

        let model = testimony::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(input.title),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };
        let testimony = self.testimony_repo.create(model).await?;

        let push_title = format!("{}님의 새 간증", author.name);
        let status = self
            .fanout
            .broadcast(&ContentEvent {
                notification_type: NotificationType::Testimony,
                related_id: &testimony.id,
                title: &push_title,
                body: &testimony.content,
                sender_id: &author.id,
                sender_name: &author.name,
            })
            .await;

        Ok((testimony, status))
    }

    /// Get a testimony by ID.
    pub async fn get(&self, id: &str) -> AppResult<testimony::Model> {
        self.testimony_repo.get_by_id(id).await
    }

    /// Page of testimonies, newest first. `author_id` narrows to one
    /// member's shares.
    pub async fn list(
        &self,
        author_id: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<testimony::Model>, bool)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let mut testimonies = match author_id {
            Some(author_id) => {
                self.testimony_repo
                    .find_page_by_author(author_id, page_size + 1, offset)
                    .await?
            }
            None => self.testimony_repo.find_page(page_size + 1, offset).await?,
        };
        let has_more = testimonies.len() as u64 > page_size;
        testimonies.truncate(page_size as usize);

        Ok((testimonies, has_more))
    }

    /// Apply a sparse patch. Only the author (or a master) may edit.
    pub async fn update(
        &self,
        actor_id: &str,
        is_master: bool,
        id: &str,
        input: UpdateTestimonyInput,
    ) -> AppResult<testimony::Model> {
        input.validate()?;

        let testimony = self.testimony_repo.get_by_id(id).await?;
        if testimony.author_id != actor_id && !is_master {
            return Err(AppError::Forbidden(
                "only the author may edit this testimony".to_string(),
            ));
        }

        let mut active: testimony::ActiveModel = testimony.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.testimony_repo.update(active).await
    }

    /// Delete a testimony and its dependents. Only the author (or a
    /// master) may delete.
    pub async fn delete(&self, actor_id: &str, is_master: bool, id: &str) -> AppResult<()> {
        let testimony = self.testimony_repo.get_by_id(id).await?;
        if testimony.author_id != actor_id && !is_master {
            return Err(AppError::Forbidden(
                "only the author may delete this testimony".to_string(),
            ));
        }

        self.testimony_repo.delete_with_dependents(id).await
    }
}
