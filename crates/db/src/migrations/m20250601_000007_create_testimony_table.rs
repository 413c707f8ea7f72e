//! Create testimony table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Testimony::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Testimony::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Testimony::AuthorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Testimony::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Testimony::Content).text().not_null())
                    .col(
                        ColumnDef::new(Testimony::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Testimony::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_testimony_author")
                            .from(Testimony::Table, Testimony::AuthorId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testimony_author_id")
                    .table(Testimony::Table)
                    .col(Testimony::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testimony_created_at")
                    .table(Testimony::Table)
                    .col(Testimony::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Testimony::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Testimony {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
