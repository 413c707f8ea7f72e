//! Notification fan-out pipeline.
//!
//! Expands one triggering content event into per-recipient notification
//! records plus a push delivery batch. The pipeline runs after the
//! triggering content has committed and is strictly best-effort: nothing
//! in here can fail the original request. Delivery is handed to the job
//! queue so the HTTP response never waits on the provider.
//!
//! Ordering policy: the availability gate runs before recipient
//! enumeration, so no notification rows are written that can never be
//! delivered. A recipient whose stored token fails the shape check is
//! excluded from the pass entirely (no row, no send).

use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::{notification, notification::NotificationType, user},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;
use serde_json::json;

use crate::services::jobs::JobSender;
use crate::services::push::{PushGateway, PushMessage, PushTarget, is_valid_push_token};

/// Character limit for the notification-feed message column.
pub const NOTIFICATION_MESSAGE_MAX_CHARS: usize = 80;

/// Character limit for the push payload body. Push payloads allow a
/// longer form than the feed column.
pub const PUSH_BODY_MAX_CHARS: usize = 200;

/// Advisory warning attached to responses when delivery was skipped.
pub const PROVIDER_UNAVAILABLE_WARNING: &str =
    "content created, but push notifications were not sent because the messaging provider is unavailable";

/// Truncate on `char` boundaries, appending an ellipsis when shortened.
///
/// Content here is Korean text; byte slicing would split a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}

/// The triggering content event being fanned out.
#[derive(Debug, Clone)]
pub struct ContentEvent<'a> {
    pub notification_type: NotificationType,
    pub related_id: &'a str,
    pub title: &'a str,
    /// Source content; truncated independently for feed and push.
    pub body: &'a str,
    pub sender_id: &'a str,
    pub sender_name: &'a str,
}

/// What happened to a fan-out pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutStatus {
    /// Rows written and a delivery batch queued.
    Queued {
        recipients: usize,
        /// Recipients excluded by the token shape check.
        skipped: usize,
    },
    /// Gate closed: the provider never initialized. Nothing was written.
    ProviderUnavailable,
    /// An infrastructure error was caught and logged mid-pass.
    Failed,
}

impl FanoutStatus {
    /// Advisory warning for the API response, if any.
    #[must_use]
    pub const fn warning(self) -> Option<&'static str> {
        match self {
            Self::ProviderUnavailable => Some(PROVIDER_UNAVAILABLE_WARNING),
            Self::Queued { .. } | Self::Failed => None,
        }
    }
}

/// Token usable for delivery, if the user has one that passes the
/// shape check.
fn eligible_token(user: &user::Model) -> Option<&str> {
    user.push_token
        .as_deref()
        .filter(|token| is_valid_push_token(token))
}

/// Notification fan-out service.
#[derive(Clone)]
pub struct FanoutService {
    user_repo: UserRepository,
    notification_repo: NotificationRepository,
    push_gateway: PushGateway,
    job_sender: JobSender,
    id_gen: IdGenerator,
}

impl FanoutService {
    /// Create a new fan-out service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        notification_repo: NotificationRepository,
        push_gateway: PushGateway,
        job_sender: JobSender,
    ) -> Self {
        Self {
            user_repo,
            notification_repo,
            push_gateway,
            job_sender,
            id_gen: IdGenerator::new(),
        }
    }

    /// Fan a content event out to every user with a deliverable token.
    ///
    /// Broadcast paths exclude no one, not even the author. Never
    /// returns an error: failures are caught, logged, and reported as
    /// [`FanoutStatus::Failed`].
    pub async fn broadcast(&self, event: &ContentEvent<'_>) -> FanoutStatus {
        if !self.push_gateway.is_enabled() {
            tracing::warn!(
                related_id = %event.related_id,
                "Skipping notification fan-out: provider unavailable"
            );
            return FanoutStatus::ProviderUnavailable;
        }

        match self.run_broadcast(event).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(
                    related_id = %event.related_id,
                    error = %e,
                    "Notification fan-out failed"
                );
                FanoutStatus::Failed
            }
        }
    }

    /// Notify a single user about an action on their content.
    ///
    /// An actor never receives a notification about their own action;
    /// that case is a successful no-op.
    pub async fn notify_user(&self, recipient_id: &str, event: &ContentEvent<'_>) -> FanoutStatus {
        if recipient_id == event.sender_id {
            return FanoutStatus::Queued {
                recipients: 0,
                skipped: 0,
            };
        }

        if !self.push_gateway.is_enabled() {
            tracing::warn!(
                recipient_id = %recipient_id,
                "Skipping targeted notification: provider unavailable"
            );
            return FanoutStatus::ProviderUnavailable;
        }

        match self.run_targeted(recipient_id, event).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(
                    recipient_id = %recipient_id,
                    error = %e,
                    "Targeted notification failed"
                );
                FanoutStatus::Failed
            }
        }
    }

    async fn run_broadcast(&self, event: &ContentEvent<'_>) -> AppResult<FanoutStatus> {
        let recipients = self.user_repo.find_push_recipients().await?;

        let mut targets = Vec::new();
        let mut skipped = 0;

        // Per-recipient writes are sequential so each badge count sees
        // its own fresh insert.
        for recipient in &recipients {
            let Some(token) = eligible_token(recipient) else {
                skipped += 1;
                continue;
            };

            self.insert_notification(&recipient.id, event).await?;
            let badge = self.notification_repo.count_unread(&recipient.id).await?;

            targets.push(PushTarget {
                user_id: recipient.id.clone(),
                token: token.to_string(),
                badge,
            });
        }

        let queued = targets.len();
        self.enqueue_delivery(event, targets).await;

        Ok(FanoutStatus::Queued {
            recipients: queued,
            skipped,
        })
    }

    async fn run_targeted(
        &self,
        recipient_id: &str,
        event: &ContentEvent<'_>,
    ) -> AppResult<FanoutStatus> {
        let Some(recipient) = self.user_repo.find_by_id(recipient_id).await? else {
            // Content owner disappeared between lookup and fan-out;
            // nothing to notify.
            return Ok(FanoutStatus::Queued {
                recipients: 0,
                skipped: 0,
            });
        };

        let Some(token) = eligible_token(&recipient).map(str::to_string) else {
            return Ok(FanoutStatus::Queued {
                recipients: 0,
                skipped: 1,
            });
        };

        self.insert_notification(&recipient.id, event).await?;
        let badge = self.notification_repo.count_unread(&recipient.id).await?;

        self.enqueue_delivery(
            event,
            vec![PushTarget {
                user_id: recipient.id,
                token,
                badge,
            }],
        )
        .await;

        Ok(FanoutStatus::Queued {
            recipients: 1,
            skipped: 0,
        })
    }

    async fn insert_notification(
        &self,
        recipient_id: &str,
        event: &ContentEvent<'_>,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            title: Set(event.title.to_string()),
            message: Set(truncate_chars(event.body, NOTIFICATION_MESSAGE_MAX_CHARS)),
            notification_type: Set(event.notification_type.clone()),
            related_id: Set(Some(event.related_id.to_string())),
            sender_id: Set(Some(event.sender_id.to_string())),
            sender_name: Set(Some(event.sender_name.to_string())),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    async fn enqueue_delivery(&self, event: &ContentEvent<'_>, targets: Vec<PushTarget>) {
        if targets.is_empty() {
            return;
        }

        let message = PushMessage {
            title: event.title.to_string(),
            body: truncate_chars(event.body, PUSH_BODY_MAX_CHARS),
            data: json!({
                "type": event.notification_type.as_str(),
                "relatedId": event.related_id,
                "action": "open_detail",
            }),
        };

        if let Err(e) = self.job_sender.push_batch(message, targets).await {
            tracing::warn!(error = %e, "Failed to enqueue push delivery batch");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::jobs::JobService;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_event(sender_id: &str) -> ContentEvent<'_> {
        ContentEvent {
            notification_type: NotificationType::Like,
            related_id: "tst1",
            title: "좋아요",
            body: "회원님의 간증에 좋아요가 달렸습니다",
            sender_id,
            sender_name: "김하늘",
        }
    }

    fn service(enabled: bool) -> FanoutService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let config = enabled.then(|| koinonia_common::config::PushConfig {
            server_key: "test-key".to_string(),
            endpoint: "http://localhost:1/fcm".to_string(),
        });
        FanoutService::new(
            UserRepository::new(Arc::clone(&db)),
            NotificationRepository::new(db),
            PushGateway::new(config),
            JobService::new().sender(),
        )
    }

    fn user_with_token(id: &str, token: Option<&str>) -> user::Model {
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
            push_token: token.map(str::to_string),
            authority: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("짧은 글", 80), "짧은 글");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "가나다라마바사아자차";
        let truncated = truncate_chars(text, 5);
        assert_eq!(truncated, "가나다라마…");
        // Must never split a code point
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn test_feed_limit_shorter_than_push_limit() {
        assert!(NOTIFICATION_MESSAGE_MAX_CHARS < PUSH_BODY_MAX_CHARS);
    }

    #[test]
    fn test_warning_only_for_unavailable_provider() {
        assert!(
            FanoutStatus::ProviderUnavailable.warning().is_some()
        );
        assert!(
            FanoutStatus::Queued {
                recipients: 3,
                skipped: 0
            }
            .warning()
            .is_none()
        );
        assert!(FanoutStatus::Failed.warning().is_none());
    }

    #[test]
    fn test_eligible_token_filters_shape() {
        let valid: String = "a".repeat(150);
        assert!(eligible_token(&user_with_token("u1", Some(&valid))).is_some());
        assert!(eligible_token(&user_with_token("u2", Some("null"))).is_none());
        assert!(eligible_token(&user_with_token("u3", None)).is_none());
    }

    #[tokio::test]
    async fn test_broadcast_gates_before_enumerating_recipients() {
        // The mock DB has no prepared results: any query would error, so
        // a clean ProviderUnavailable proves the gate ran first.
        let status = service(false).broadcast(&test_event("usr1")).await;
        assert_eq!(status, FanoutStatus::ProviderUnavailable);
    }

    #[tokio::test]
    async fn test_actor_never_notified_about_own_action() {
        let status = service(true)
            .notify_user("usr1", &test_event("usr1"))
            .await;
        assert_eq!(
            status,
            FanoutStatus::Queued {
                recipients: 0,
                skipped: 0
            }
        );
    }
}
