//! Comment service.
//!
//! Comments attach to notices and testimonies; a comment with a parent
//! is a reply. Each creation triggers a targeted notification to the
//! owner of what was commented on (the content author, or the parent
//! comment's author for replies).

use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{comment, comment::ContentType, notification::NotificationType, user},
    repositories::{CommentRepository, NoticeRepository, TestimonyRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::fanout::{ContentEvent, FanoutService, FanoutStatus};

/// Input for creating a comment or reply.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    pub target_type: ContentType,

    #[validate(length(min = 1, max = 32))]
    pub target_id: String,

    /// Present for replies.
    pub parent_id: Option<String>,

    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// A comment with its author's display name resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub target_type: ContentType,
    pub target_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    notice_repo: NoticeRepository,
    testimony_repo: TestimonyRepository,
    user_repo: UserRepository,
    fanout: FanoutService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        notice_repo: NoticeRepository,
        testimony_repo: TestimonyRepository,
        user_repo: UserRepository,
        fanout: FanoutService,
    ) -> Self {
        Self {
            comment_repo,
            notice_repo,
            testimony_repo,
            user_repo,
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    /// Author of the content item being commented on.
    async fn target_author(&self, target_type: ContentType, target_id: &str) -> AppResult<String> {
        match target_type {
            ContentType::Notice => Ok(self.notice_repo.get_by_id(target_id).await?.author_id),
            ContentType::Testimony => {
                Ok(self.testimony_repo.get_by_id(target_id).await?.author_id)
            }
        }
    }

    /// Create a comment and notify whoever owns the thing commented on.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<(comment::Model, FanoutStatus)> {
        input.validate()?;

        // The target must exist before anything is written
        let content_author = self
            .target_author(input.target_type, &input.target_id)
            .await?;

        // A reply notifies the parent comment's author instead
        let (notification_type, recipient_id) = match &input.parent_id {
            Some(parent_id) => {
                let parent = self.comment_repo.get_by_id(parent_id).await?;
                if parent.target_id != input.target_id {
                    return Err(AppError::Validation(
                        "parent comment belongs to a different item".to_string(),
                    ));
                }
                (NotificationType::Reply, parent.author_id)
            }
            None => (NotificationType::Comment, content_author),
        };

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            target_type: Set(input.target_type),
            target_id: Set(input.target_id.clone()),
            parent_id: Set(input.parent_id),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
        };
        let comment = self.comment_repo.create(model).await?;

        let push_title = if notification_type == NotificationType::Reply {
            format!("{}님이 답글을 남겼습니다", author.name)
        } else {
            format!("{}님이 댓글을 남겼습니다", author.name)
        };
        let status = self
            .fanout
            .notify_user(
                &recipient_id,
                &ContentEvent {
                    notification_type,
                    related_id: &comment.target_id,
                    title: &push_title,
                    body: &comment.content,
                    sender_id: &author.id,
                    sender_name: &author.name,
                },
            )
            .await;

        Ok((comment, status))
    }

    /// Comments on a content item in thread order, with author names.
    pub async fn list(
        &self,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<Vec<CommentView>> {
        let comments = self
            .comment_repo
            .find_by_target(target_type, target_id)
            .await?;

        let author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        let authors = self.user_repo.find_by_ids(&author_ids).await?;

        Ok(comments
            .into_iter()
            .map(|c| {
                let author_name = authors
                    .iter()
                    .find(|u| u.id == c.author_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default();
                CommentView {
                    id: c.id,
                    author_id: c.author_id,
                    author_name,
                    target_type: c.target_type,
                    target_id: c.target_id,
                    parent_id: c.parent_id,
                    content: c.content,
                    created_at: c.created_at.to_rfc3339(),
                }
            })
            .collect())
    }

    /// Delete a comment. Only the author (or a master) may delete.
    pub async fn delete(&self, actor_id: &str, is_master: bool, id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(id).await?;
        if comment.author_id != actor_id && !is_master {
            return Err(AppError::Forbidden(
                "only the author may delete this comment".to_string(),
            ));
        }

        self.comment_repo.delete(id).await
    }
}
