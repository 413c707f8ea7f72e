//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_authority_tables;
mod m20250601_000003_create_user_authority_table;
mod m20250601_000004_create_refresh_token_table;
mod m20250601_000005_create_notification_table;
mod m20250601_000006_create_notice_table;
mod m20250601_000007_create_testimony_table;
mod m20250601_000008_create_comment_table;
mod m20250601_000009_create_like_table;
mod m20250601_000010_create_event_table;
mod m20250601_000011_create_organization_tables;
mod m20250601_000012_create_team_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_authority_tables::Migration),
            Box::new(m20250601_000003_create_user_authority_table::Migration),
            Box::new(m20250601_000004_create_refresh_token_table::Migration),
            Box::new(m20250601_000005_create_notification_table::Migration),
            Box::new(m20250601_000006_create_notice_table::Migration),
            Box::new(m20250601_000007_create_testimony_table::Migration),
            Box::new(m20250601_000008_create_comment_table::Migration),
            Box::new(m20250601_000009_create_like_table::Migration),
            Box::new(m20250601_000010_create_event_table::Migration),
            Box::new(m20250601_000011_create_organization_tables::Migration),
            Box::new(m20250601_000012_create_team_tables::Migration),
        ]
    }
}
