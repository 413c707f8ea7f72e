//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `koinonia_test`)
//!   `TEST_DB_PASSWORD` (default: `koinonia_test`)
//!   `TEST_DB_NAME` (default: `koinonia_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use koinonia_db::entities::{notification, notification::NotificationType, user, user_authority};
use koinonia_db::repositories::{
    NotificationRepository, UserAuthorityRepository, UserRepository,
};
use koinonia_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

fn user_model(id: &str, phone: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        phone: Set(phone.to_string()),
        password: Set("$argon2id$stub".to_string()),
        name: Set("김하늘".to_string()),
        email: Set(None),
        birthday: Set(None),
        gender: Set(None),
        school: Set(None),
        grade: Set(None),
        branch_id: Set(None),
        region_id: Set(None),
        group_id: Set(None),
        push_token: Set(None),
        authority: Set(None),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    }
}

fn notification_model(id: &str, recipient_id: &str) -> notification::ActiveModel {
    notification::ActiveModel {
        id: Set(id.to_string()),
        recipient_id: Set(recipient_id.to_string()),
        title: Set("알림".to_string()),
        message: Set("메시지".to_string()),
        notification_type: Set(NotificationType::System),
        related_id: Set(None),
        sender_id: Set(None),
        sender_name: Set(None),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_badge_count_follows_read_transitions() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    koinonia_db::migrate(db.connection()).await.unwrap();
    db.cleanup().await.unwrap();

    let conn = db.conn.clone();
    let users = UserRepository::new(Arc::clone(&conn));
    let notifications = NotificationRepository::new(conn);

    users.create(user_model("usr_badge", "01011112222")).await.unwrap();

    // N unread inserts -> badge N
    for i in 0..3 {
        notifications
            .create(notification_model(&format!("ntf_badge_{i}"), "usr_badge"))
            .await
            .unwrap();
    }
    assert_eq!(notifications.count_unread("usr_badge").await.unwrap(), 3);

    // One read -> N-1
    notifications.mark_as_read("ntf_badge_0").await.unwrap();
    assert_eq!(notifications.count_unread("usr_badge").await.unwrap(), 2);

    // All read -> 0
    notifications.mark_all_as_read("usr_badge").await.unwrap();
    assert_eq!(notifications.count_unread("usr_badge").await.unwrap(), 0);

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_assignment_reactivation_keeps_one_row() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    koinonia_db::migrate(db.connection()).await.unwrap();
    db.cleanup().await.unwrap();

    let conn = db.conn.clone();
    let users = UserRepository::new(Arc::clone(&conn));
    let assignments = UserAuthorityRepository::new(conn);

    users.create(user_model("usr_roles", "01033334444")).await.unwrap();

    assignments
        .create(user_authority::ActiveModel {
            id: Set("ua_1".to_string()),
            user_id: Set("usr_roles".to_string()),
            authority_id: Set("auth_team_leader".to_string()),
            is_active: Set(true),
            assigned_by: Set(None),
            assigned_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();

    // Soft-deactivate, then reactivate the same row
    let row = assignments
        .find_by_pair("usr_roles", "auth_team_leader")
        .await
        .unwrap()
        .unwrap();
    let mut active: user_authority::ActiveModel = row.into();
    active.is_active = Set(false);
    assignments.update(active).await.unwrap();

    assert!(
        assignments
            .find_active_with_authority("usr_roles")
            .await
            .unwrap()
            .is_empty()
    );

    let row = assignments
        .find_by_pair("usr_roles", "auth_team_leader")
        .await
        .unwrap()
        .unwrap();
    let mut active: user_authority::ActiveModel = row.into();
    active.is_active = Set(true);
    assignments.update(active).await.unwrap();

    let resolved = assignments
        .find_active_with_authority("usr_roles")
        .await
        .unwrap();
    assert_eq!(resolved.len(), 1);
    let (_, authority) = &resolved[0];
    assert_eq!(authority.as_ref().unwrap().name, "TEAM_LEADER");

    db.cleanup().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
}
