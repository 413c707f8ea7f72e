//! Create notification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::RecipientId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::Title)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::Message)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::NotificationType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::RelatedId).string_len(32))
                    .col(ColumnDef::new(Notification::SenderId).string_len(32))
                    .col(ColumnDef::new(Notification::SenderName).string_len(128))
                    .col(
                        ColumnDef::new(Notification::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_recipient")
                            .from(Notification::Table, Notification::RecipientId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: recipient_id (for listing a user's notifications)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_recipient_id")
                    .table(Notification::Table)
                    .col(Notification::RecipientId)
                    .to_owned(),
            )
            .await?;

        // Index: (recipient_id, is_read) (for the badge count)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_recipient_is_read")
                    .table(Notification::Table)
                    .col(Notification::RecipientId)
                    .col(Notification::IsRead)
                    .to_owned(),
            )
            .await?;

        // Index: (recipient_id, related_id) (for mark-related-read)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_recipient_related")
                    .table(Notification::Table)
                    .col(Notification::RecipientId)
                    .col(Notification::RelatedId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    RecipientId,
    Title,
    Message,
    NotificationType,
    RelatedId,
    SenderId,
    SenderName,
    IsRead,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
