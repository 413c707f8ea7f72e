//! Create team and team member tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Team::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Team::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Team::Description).text())
                    .col(ColumnDef::new(Team::LeaderId).string_len(32))
                    .col(
                        ColumnDef::new(Team::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamMember::TeamId).string_len(32).not_null())
                    .col(ColumnDef::new(TeamMember::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TeamMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_member_team")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_member_user")
                            .from(TeamMember::Table, TeamMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership per (team, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_team_member_pair")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .col(TeamMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Team {
    Table,
    Id,
    Name,
    Description,
    LeaderId,
    CreatedAt,
}

#[derive(Iden)]
enum TeamMember {
    Table,
    Id,
    TeamId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
