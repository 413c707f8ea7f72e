//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::Phone)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Password).string_len(256).not_null())
                    .col(ColumnDef::new(User::Name).string_len(128).not_null())
                    .col(ColumnDef::new(User::Email).string_len(256))
                    .col(ColumnDef::new(User::Birthday).date())
                    .col(ColumnDef::new(User::Gender).string_len(16))
                    .col(ColumnDef::new(User::School).string_len(128))
                    .col(ColumnDef::new(User::Grade).string_len(32))
                    .col(ColumnDef::new(User::BranchId).string_len(32))
                    .col(ColumnDef::new(User::RegionId).string_len(32))
                    .col(ColumnDef::new(User::GroupId).string_len(32))
                    .col(ColumnDef::new(User::PushToken).string_len(512))
                    .col(ColumnDef::new(User::Authority).string_len(128))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: phone is the login key
        manager
            .create_index(
                Index::create()
                    .name("idx_user_phone")
                    .table(User::Table)
                    .col(User::Phone)
                    .to_owned(),
            )
            .await?;

        // Index: push_token (broadcast recipient enumeration)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_push_token")
                    .table(User::Table)
                    .col(User::PushToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Phone,
    Password,
    Name,
    Email,
    Birthday,
    Gender,
    School,
    Grade,
    BranchId,
    RegionId,
    GroupId,
    PushToken,
    Authority,
    CreatedAt,
    UpdatedAt,
}
