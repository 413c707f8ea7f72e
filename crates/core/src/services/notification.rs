//! Notification service.
//!
//! Read-side and read-state transitions for notification records. Rows
//! are created by the fan-out pipeline (or [`NotificationService::create_system`]
//! for direct single-recipient notifications) and owned exclusively by
//! their recipient.

use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{notification, notification::NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// A page of notifications plus the metadata the client renders.
#[derive(Debug)]
pub struct NotificationPage {
    pub items: Vec<notification::Model>,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
    pub unread_count: u64,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a direct system notification for one recipient.
    pub async fn create_system(
        &self,
        recipient_id: &str,
        title: &str,
        message: &str,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            notification_type: Set(NotificationType::System),
            related_id: Set(None),
            sender_id: Set(None),
            sender_name: Set(None),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Page through a user's notifications, newest first.
    pub async fn list(
        &self,
        recipient_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<NotificationPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut items = self
            .notification_repo
            .find_page_by_recipient(recipient_id, page, page_size)
            .await?;

        let has_more = items.len() as u64 > page_size;
        items.truncate(page_size as usize);

        let unread_count = self.notification_repo.count_unread(recipient_id).await?;

        Ok(NotificationPage {
            items,
            page,
            page_size,
            has_more,
            unread_count,
        })
    }

    /// Current badge number for a user.
    pub async fn badge_count(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }

    /// Mark one notification as read.
    ///
    /// Only the recipient may flip the flag; anyone else gets not-found
    /// rather than a hint the id exists.
    pub async fn mark_as_read(&self, recipient_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        if notification.recipient_id != recipient_id {
            return Err(AppError::NotFound(format!(
                "notification {notification_id}"
            )));
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark all of a user's notifications as read.
    pub async fn mark_all_as_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }

    /// Mark all of a user's notifications about one content item as read
    /// (opening a notice clears every notification that points at it).
    pub async fn mark_related_as_read(
        &self,
        recipient_id: &str,
        related_id: &str,
    ) -> AppResult<u64> {
        self.notification_repo
            .mark_related_as_read(recipient_id, related_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn notification_model(id: &str, recipient_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            title: "새 댓글".to_string(),
            message: "간증에 댓글이 달렸습니다".to_string(),
            notification_type: NotificationType::Comment,
            related_id: Some("tst1".to_string()),
            sender_id: Some("usr2".to_string()),
            sender_name: Some("박믿음".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_mark_as_read_rejects_foreign_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[notification_model("ntf1", "usr1")]])
            .into_connection();

        let result = service(db).mark_as_read("usr2", "ntf1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_as_read_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notification::Model>::new()])
            .into_connection();

        let result = service(db).mark_as_read("usr1", "ntf_missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
