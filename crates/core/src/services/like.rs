//! Like service.

use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::{comment::ContentType, like, notification::NotificationType, user},
    repositories::{LikeRepository, NoticeRepository, TestimonyRepository},
};
use sea_orm::Set;

use crate::services::fanout::{ContentEvent, FanoutService, FanoutStatus};

/// Like state of one content item as seen by one user.
#[derive(Debug, Clone, Copy)]
pub struct LikeSummary {
    pub count: u64,
    pub liked_by_me: bool,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    notice_repo: NoticeRepository,
    testimony_repo: TestimonyRepository,
    fanout: FanoutService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        notice_repo: NoticeRepository,
        testimony_repo: TestimonyRepository,
        fanout: FanoutService,
    ) -> Self {
        Self {
            like_repo,
            notice_repo,
            testimony_repo,
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    async fn target_author(&self, target_type: ContentType, target_id: &str) -> AppResult<String> {
        match target_type {
            ContentType::Notice => Ok(self.notice_repo.get_by_id(target_id).await?.author_id),
            ContentType::Testimony => {
                Ok(self.testimony_repo.get_by_id(target_id).await?.author_id)
            }
        }
    }

    /// Like a content item.
    ///
    /// Idempotent: liking twice keeps one row and sends no second
    /// notification. The content author is notified unless they are the
    /// actor.
    pub async fn like(
        &self,
        actor: &user::Model,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<FanoutStatus> {
        let content_author = self.target_author(target_type, target_id).await?;

        if self
            .like_repo
            .find_by_user_and_target(&actor.id, target_type, target_id)
            .await?
            .is_some()
        {
            return Ok(FanoutStatus::Queued {
                recipients: 0,
                skipped: 0,
            });
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor.id.clone()),
            target_type: Set(target_type),
            target_id: Set(target_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.like_repo.create(model).await?;

        let push_title = format!("{}님이 좋아요를 눌렀습니다", actor.name);
        let body = format!("내 {} 글에 좋아요가 달렸습니다", match target_type {
            ContentType::Notice => "공지",
            ContentType::Testimony => "간증",
        });
        let status = self
            .fanout
            .notify_user(
                &content_author,
                &ContentEvent {
                    notification_type: NotificationType::Like,
                    related_id: target_id,
                    title: &push_title,
                    body: &body,
                    sender_id: &actor.id,
                    sender_name: &actor.name,
                },
            )
            .await;

        Ok(status)
    }

    /// Remove a like. Unliking something never liked is a no-op success.
    pub async fn unlike(
        &self,
        actor_id: &str,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<()> {
        self.like_repo
            .delete_by_user_and_target(actor_id, target_type, target_id)
            .await
    }

    /// Like count and whether the viewer has liked.
    pub async fn summary(
        &self,
        viewer_id: &str,
        target_type: ContentType,
        target_id: &str,
    ) -> AppResult<LikeSummary> {
        let count = self.like_repo.count_by_target(target_type, target_id).await?;
        let liked_by_me = self
            .like_repo
            .find_by_user_and_target(viewer_id, target_type, target_id)
            .await?
            .is_some();

        Ok(LikeSummary { count, liked_by_me })
    }
}
