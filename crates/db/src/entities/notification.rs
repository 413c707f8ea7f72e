//! Notification entity.
//!
//! One row per (recipient, event) pair, exclusively owned by its
//! recipient. Created by the fan-out pipeline; mutated only by read-state
//! transitions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    #[sea_orm(string_value = "notice")]
    Notice,
    #[sea_orm(string_value = "testimony")]
    Testimony,
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "reply")]
    Reply,
    #[sea_orm(string_value = "system")]
    System,
}

impl NotificationType {
    /// Wire name used in push payloads and API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Testimony => "testimony",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification.
    pub recipient_id: String,

    pub title: String,

    /// Body text, truncated from the source content for feed display.
    pub message: String,

    pub notification_type: NotificationType,

    /// Id of the triggering content item (notice, testimony, comment).
    #[sea_orm(nullable)]
    pub related_id: Option<String>,

    /// The user whose action triggered the notification.
    #[sea_orm(nullable)]
    pub sender_id: Option<String>,

    /// Sender display name, denormalized at creation time.
    #[sea_orm(nullable)]
    pub sender_name: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
