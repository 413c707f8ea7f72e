//! Create user-authority assignment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAuthority::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAuthority::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserAuthority::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAuthority::AuthorityId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAuthority::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UserAuthority::AssignedBy).string_len(32))
                    .col(
                        ColumnDef::new(UserAuthority::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(UserAuthority::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_authority_user")
                            .from(UserAuthority::Table, UserAuthority::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_authority_authority")
                            .from(UserAuthority::Table, UserAuthority::AuthorityId)
                            .to(Authority::Table, Authority::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One assignment row per (user, authority) pair; reactivation
        // updates it in place.
        manager
            .create_index(
                Index::create()
                    .name("idx_user_authority_pair")
                    .table(UserAuthority::Table)
                    .col(UserAuthority::UserId)
                    .col(UserAuthority::AuthorityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, is_active) (resolution hot path)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_authority_user_active")
                    .table(UserAuthority::Table)
                    .col(UserAuthority::UserId)
                    .col(UserAuthority::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAuthority::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserAuthority {
    Table,
    Id,
    UserId,
    AuthorityId,
    IsActive,
    AssignedBy,
    AssignedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Authority {
    Table,
    Id,
}
