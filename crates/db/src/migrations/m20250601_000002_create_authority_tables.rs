//! Create authority category and authority tables, seeded with the
//! role reference data.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (id, category, name, display name, level). Level ranks seniority
/// ascending: 0 is the most senior role.
const AUTHORITIES: &[(&str, &str, &str, &str, i32)] = &[
    ("auth_master", "cat_organization", "MASTER", "총관리자", 0),
    ("auth_general_director", "cat_organization", "GENERAL_DIRECTOR", "총단장", 1),
    ("auth_branch_director", "cat_organization", "BRANCH_DIRECTOR", "지부장", 2),
    ("auth_region_director", "cat_organization", "REGION_DIRECTOR", "지역장", 3),
    ("auth_group_leader", "cat_organization", "GROUP_LEADER", "그룹장", 4),
    ("auth_team_leader", "cat_ministry", "TEAM_LEADER", "팀장", 5),
    ("auth_leader", "cat_ministry", "LEADER", "리더", 6),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthorityCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthorityCategory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthorityCategory::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AuthorityCategory::DisplayName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthorityCategory::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Authority::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Authority::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Authority::CategoryId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Authority::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Authority::DisplayName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Authority::Level).integer().not_null())
                    .col(
                        ColumnDef::new(Authority::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authority_category")
                            .from(Authority::Table, Authority::CategoryId)
                            .to(AuthorityCategory::Table, AuthorityCategory::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_authority_level")
                    .table(Authority::Table)
                    .col(Authority::Level)
                    .to_owned(),
            )
            .await?;

        // Seed reference data
        let categories = Query::insert()
            .into_table(AuthorityCategory::Table)
            .columns([
                AuthorityCategory::Id,
                AuthorityCategory::Name,
                AuthorityCategory::DisplayName,
                AuthorityCategory::SortOrder,
            ])
            .values_panic(["cat_organization".into(), "organization".into(), "조직".into(), 0.into()])
            .values_panic(["cat_ministry".into(), "ministry".into(), "사역".into(), 1.into()])
            .to_owned();
        manager.exec_stmt(categories).await?;

        let mut authorities = Query::insert()
            .into_table(Authority::Table)
            .columns([
                Authority::Id,
                Authority::CategoryId,
                Authority::Name,
                Authority::DisplayName,
                Authority::Level,
            ])
            .to_owned();
        for (id, category_id, name, display_name, level) in AUTHORITIES {
            authorities.values_panic([
                (*id).into(),
                (*category_id).into(),
                (*name).into(),
                (*display_name).into(),
                (*level).into(),
            ]);
        }
        manager.exec_stmt(authorities).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Authority::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthorityCategory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuthorityCategory {
    Table,
    Id,
    Name,
    DisplayName,
    SortOrder,
}

#[derive(Iden)]
enum Authority {
    Table,
    Id,
    CategoryId,
    Name,
    DisplayName,
    Level,
    CreatedAt,
}
