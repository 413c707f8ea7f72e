//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of a user's notifications, newest first.
    ///
    /// Fetches `page_size + 1` rows so the caller can derive `has_more`
    /// without a second count query.
    pub async fn find_page_by_recipient(
        &self,
        recipient_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .order_by_desc(notification::Column::Id)
            .offset(page.saturating_sub(1) * page_size)
            .limit(page_size + 1)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count unread notifications for a user (the badge number).
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        let notification = self.find_by_id(id).await?;
        if let Some(n) = notification {
            let mut active: notification::ActiveModel = n.into();
            active.is_read = Set(true);
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Mark all of a user's notifications as read.
    pub async fn mark_all_as_read(&self, recipient_id: &str) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Mark all of a user's notifications about one content item as read.
    pub async fn mark_related_as_read(
        &self,
        recipient_id: &str,
        related_id: &str,
    ) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::RelatedId.eq(related_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notification::NotificationType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_notification(id: &str, recipient_id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            title: "새 공지사항".to_string(),
            message: "이번 주 금요 모임 장소가 변경되었습니다".to_string(),
            notification_type: NotificationType::Notice,
            related_id: Some("ntc1".to_string()),
            sender_id: Some("usr_admin".to_string()),
            sender_name: Some("관리자".to_string()),
            is_read,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let notification = create_test_notification("ntf1", "usr1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notification.clone()]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let found = repo.find_by_id("ntf1").await.unwrap();

        assert_eq!(found.unwrap().recipient_id, "usr1");
    }

    #[tokio::test]
    async fn test_mark_all_as_read_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let count = repo.mark_all_as_read("usr1").await.unwrap();

        assert_eq!(count, 3);
    }
}
