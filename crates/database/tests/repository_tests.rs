//! Integration tests for the relay-database repositories.

use relay_config::DatabaseConfig;
use relay_database::{
    initialize_database, ChatError, ChatRepository, CreateMessageRequest,
    CreateNotificationRequest, MemberRepository, MessageRepository, NotificationKind,
    NotificationRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn create_test_database() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("repos.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: 2,
    };

    let pool = initialize_database(&config).await.unwrap();
    (pool, temp_dir)
}

async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO users (username, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();
    result.last_insert_rowid()
}

#[tokio::test]
async fn group_chats_are_minted_an_invite_token() {
    let (pool, _dir) = create_test_database().await;
    let chats = ChatRepository::new(pool.clone());

    let direct = chats.create(false).await.unwrap();
    assert!(direct.invite_token.is_none());
    assert!(!direct.invite_matches("anything"));

    let group = chats.create(true).await.unwrap();
    let token = group.invite_token.clone().unwrap();
    assert!(group.invite_matches(&token));
    assert!(!group.invite_matches("wrong-token"));

    let found = chats.find_by_id(group.id).await.unwrap().unwrap();
    assert_eq!(found, group);
    assert!(chats.find_by_id(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn adding_a_member_twice_is_a_noop() {
    let (pool, _dir) = create_test_database().await;
    let chats = ChatRepository::new(pool.clone());
    let members = MemberRepository::new(pool.clone());

    let user = seed_user(&pool, "alice").await;
    let chat = chats.create(true).await.unwrap();

    assert!(!members.is_member(chat.id, user).await.unwrap());

    members.add(chat.id, user).await.unwrap();
    members.add(chat.id, user).await.unwrap();

    assert!(members.is_member(chat.id, user).await.unwrap());
    assert_eq!(members.find_by_chat_id(chat.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn message_history_is_ordered_by_recency_and_skips_deleted() {
    let (pool, _dir) = create_test_database().await;
    let chats = ChatRepository::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());

    let sender = seed_user(&pool, "bob").await;
    let chat = chats.create(false).await.unwrap();

    let mut ids = Vec::new();
    for n in 0..3 {
        let created = messages
            .create(
                sender,
                &CreateMessageRequest {
                    chat_id: chat.id,
                    content: Some(format!("message {n}")),
                    media: None,
                },
            )
            .await
            .unwrap();
        ids.push(created.id);
    }

    assert!(messages.mark_deleted(ids[1], sender).await.unwrap());

    let history = messages.find_by_chat_id(chat.id, None, None).await.unwrap();
    let listed: Vec<i64> = history.iter().map(|m| m.id).collect();
    assert_eq!(listed, vec![ids[2], ids[0]]);
}

#[tokio::test]
async fn only_the_sender_may_edit_or_delete() {
    let (pool, _dir) = create_test_database().await;
    let chats = ChatRepository::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());

    let author = seed_user(&pool, "carol").await;
    let other = seed_user(&pool, "mallory").await;
    let chat = chats.create(false).await.unwrap();

    let message = messages
        .create(
            author,
            &CreateMessageRequest {
                chat_id: chat.id,
                content: Some("original".to_string()),
                media: None,
            },
        )
        .await
        .unwrap();

    let edit = messages.update_content(message.id, other, "tampered").await;
    assert!(matches!(edit, Err(ChatError::OwnershipViolation)));

    let delete = messages.mark_deleted(message.id, other).await;
    assert!(matches!(delete, Err(ChatError::OwnershipViolation)));

    // Content untouched by the rejected attempts
    let unchanged = messages.find_by_id(message.id).await.unwrap().unwrap();
    assert_eq!(unchanged.content.as_deref(), Some("original"));
    assert!(!unchanged.edited);

    let edited = messages
        .update_content(message.id, author, "revised")
        .await
        .unwrap();
    assert_eq!(edited.content.as_deref(), Some("revised"));
    assert!(edited.edited);
}

#[tokio::test]
async fn delete_is_idempotent_for_missing_and_deleted_targets() {
    let (pool, _dir) = create_test_database().await;
    let chats = ChatRepository::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());

    let sender = seed_user(&pool, "dave").await;
    let chat = chats.create(false).await.unwrap();

    // Nonexistent target: success, nothing deleted
    assert!(!messages.mark_deleted(4242, sender).await.unwrap());

    let message = messages
        .create(
            sender,
            &CreateMessageRequest {
                chat_id: chat.id,
                content: Some("going away".to_string()),
                media: None,
            },
        )
        .await
        .unwrap();

    assert!(messages.mark_deleted(message.id, sender).await.unwrap());
    assert!(!messages.mark_deleted(message.id, sender).await.unwrap());

    // Deleted messages are excluded from further edits
    let edit = messages.update_content(message.id, sender, "too late").await;
    assert!(matches!(edit, Err(ChatError::MessageNotFound)));
}

#[tokio::test]
async fn notifications_list_newest_first_and_mark_read() {
    let (pool, _dir) = create_test_database().await;
    let notifications = NotificationRepository::new(pool.clone());

    let recipient = seed_user(&pool, "erin").await;
    let sender = seed_user(&pool, "frank").await;

    let first = notifications
        .create(&CreateNotificationRequest {
            user_id: recipient,
            sender_id: Some(sender),
            message: "frank started following you.".to_string(),
            kind: NotificationKind::Follow,
        })
        .await
        .unwrap();
    let second = notifications
        .create(&CreateNotificationRequest {
            user_id: recipient,
            sender_id: Some(sender),
            message: "frank liked your post.".to_string(),
            kind: NotificationKind::Like,
        })
        .await
        .unwrap();

    let listed = notifications
        .find_by_user_id(recipient, false, None, None)
        .await
        .unwrap();
    let ids: Vec<i64> = listed.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    notifications.mark_read(first.id, recipient).await.unwrap();

    let unread = notifications
        .find_by_user_id(recipient, true, None, None)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, second.id);

    // Another user cannot mark it
    assert!(notifications.mark_read(second.id, sender).await.is_err());
}
