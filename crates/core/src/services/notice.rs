//! Notice service.

use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::{notice, notification::NotificationType, user},
    repositories::NoticeRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::fanout::{ContentEvent, FanoutService, FanoutStatus};

/// Input for creating a notice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoticeInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    #[serde(default)]
    pub is_pinned: bool,
}

/// Sparse patch for a notice.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateNoticeInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub is_pinned: Option<bool>,
}

/// Notice service for business logic.
#[derive(Clone)]
pub struct NoticeService {
    notice_repo: NoticeRepository,
    fanout: FanoutService,
    id_gen: IdGenerator,
}

impl NoticeService {
    /// Create a new notice service.
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository, fanout: FanoutService) -> Self {
        Self {
            notice_repo,
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a notice and broadcast it to every deliverable member.
    ///
    /// The notice commits first; fan-out runs after and can only degrade
    /// to an advisory status, never fail the creation.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateNoticeInput,
    ) -> AppResult<(notice::Model, FanoutStatus)> {
        input.validate()?;

        let model = notice::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(input.title),
            content: Set(input.content),
            is_pinned: Set(input.is_pinned),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };
        let notice = self.notice_repo.create(model).await?;

        let push_title = format!("새 공지: {}", notice.title);
        let status = self
            .fanout
            .broadcast(&ContentEvent {
                notification_type: NotificationType::Notice,
                related_id: &notice.id,
                title: &push_title,
                body: &notice.content,
                sender_id: &author.id,
                sender_name: &author.name,
            })
            .await;

        Ok((notice, status))
    }

    /// Get a notice by ID.
    pub async fn get(&self, id: &str) -> AppResult<notice::Model> {
        self.notice_repo.get_by_id(id).await
    }

    /// Page of notices, pinned first.
    pub async fn list(&self, page: u64, page_size: u64) -> AppResult<(Vec<notice::Model>, bool)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut notices = self
            .notice_repo
            .find_page(page_size + 1, (page - 1) * page_size)
            .await?;
        let has_more = notices.len() as u64 > page_size;
        notices.truncate(page_size as usize);

        Ok((notices, has_more))
    }

    /// Apply a sparse patch to a notice.
    pub async fn update(&self, id: &str, input: UpdateNoticeInput) -> AppResult<notice::Model> {
        input.validate()?;

        let notice = self.notice_repo.get_by_id(id).await?;
        let mut active: notice::ActiveModel = notice.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(is_pinned) = input.is_pinned {
            active.is_pinned = Set(is_pinned);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.notice_repo.update(active).await
    }

    /// Delete a notice and its dependent comments and likes.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        // Ensure not-found surfaces before the transactional cascade
        self.notice_repo.get_by_id(id).await?;
        self.notice_repo.delete_with_dependents(id).await
    }
}
