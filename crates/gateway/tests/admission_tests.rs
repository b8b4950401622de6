//! Admission tests for the chat session authorization gate.

use relay_auth::{Identity, UserRef};
use relay_config::AppConfig;
use relay_database::initialize_database;
use relay_gateway::{authorize_chat_session, AdmissionDenied, GatewayState};
use relay_registry::GroupKey;
use tempfile::TempDir;

struct TestGateway {
    state: GatewayState,
    _dir: TempDir,
}

impl TestGateway {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("gateway.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.display());
        config.database.max_connections = 2;

        let pool = initialize_database(&config.database).await.unwrap();
        let state = GatewayState::new(pool, &config);

        Self { state, _dir: dir }
    }

    async fn register(&self, username: &str) -> UserRef {
        let user = self
            .state
            .authenticator
            .register_with_password(username, "test-password-1")
            .await
            .unwrap();
        UserRef {
            id: user.id,
            username: user.username,
        }
    }
}

#[tokio::test]
async fn members_are_admitted() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let chat = gateway.state.chats.create(alice.id, false, &[]).await.unwrap();

    let admitted = authorize_chat_session(
        &gateway.state,
        chat.id,
        None,
        &Identity::User(alice.clone()),
    )
    .await
    .unwrap();

    assert_eq!(admitted, alice);
}

#[tokio::test]
async fn anonymous_is_denied_even_with_a_valid_invite() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let group = gateway.state.chats.create(alice.id, true, &[]).await.unwrap();
    let token = group.invite_token.clone().unwrap();

    let denied = authorize_chat_session(
        &gateway.state,
        group.id,
        Some(&token),
        &Identity::Anonymous,
    )
    .await
    .unwrap_err();

    assert_eq!(denied, AdmissionDenied::Anonymous);
}

#[tokio::test]
async fn non_members_are_refused_and_the_registry_is_untouched() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let bob = gateway.register("bob").await;
    let chat = gateway.state.chats.create(alice.id, false, &[]).await.unwrap();

    let denied =
        authorize_chat_session(&gateway.state, chat.id, None, &Identity::User(bob.clone()))
            .await
            .unwrap_err();

    assert_eq!(denied, AdmissionDenied::NotAMember);
    assert_eq!(
        gateway.state.router.group_size(&GroupKey::Chat(chat.id)).await,
        0
    );
    // The refusal did not grow the membership set
    assert!(!gateway
        .state
        .membership
        .is_member(chat.id, bob.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn unknown_chats_deny_with_a_distinct_reason() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;

    let denied = authorize_chat_session(&gateway.state, 9999, None, &Identity::User(alice))
        .await
        .unwrap_err();

    assert_eq!(denied, AdmissionDenied::ChatNotFound);
}

#[tokio::test]
async fn a_valid_invite_admits_and_joins_the_membership_set() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let dora = gateway.register("dora").await;
    let group = gateway.state.chats.create(alice.id, true, &[]).await.unwrap();
    let token = group.invite_token.clone().unwrap();

    let admitted = authorize_chat_session(
        &gateway.state,
        group.id,
        Some(&token),
        &Identity::User(dora.clone()),
    )
    .await
    .unwrap();

    assert_eq!(admitted, dora);
    assert!(gateway
        .state
        .membership
        .is_member(group.id, dora.id)
        .await
        .unwrap());

    // The invite keeps working for later callers; re-admission is idempotent
    let again = authorize_chat_session(
        &gateway.state,
        group.id,
        Some(&token),
        &Identity::User(dora.clone()),
    )
    .await
    .unwrap();
    assert_eq!(again, dora);
}

#[tokio::test]
async fn a_bad_invite_falls_back_to_the_membership_check() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let eve = gateway.register("eve").await;
    let group = gateway.state.chats.create(alice.id, true, &[]).await.unwrap();

    // Wrong token, not a member: denied
    let denied = authorize_chat_session(
        &gateway.state,
        group.id,
        Some("bogus-token"),
        &Identity::User(eve.clone()),
    )
    .await
    .unwrap_err();
    assert_eq!(denied, AdmissionDenied::NotAMember);
    assert!(!gateway
        .state
        .membership
        .is_member(group.id, eve.id)
        .await
        .unwrap());

    // Wrong token but already a member: still admitted
    let admitted = authorize_chat_session(
        &gateway.state,
        group.id,
        Some("bogus-token"),
        &Identity::User(alice.clone()),
    )
    .await
    .unwrap();
    assert_eq!(admitted, alice);
}

#[tokio::test]
async fn invites_never_admit_to_direct_chats() {
    let gateway = TestGateway::new().await;
    let alice = gateway.register("alice").await;
    let frank = gateway.register("frank").await;
    let direct = gateway.state.chats.create(alice.id, false, &[]).await.unwrap();

    let denied = authorize_chat_session(
        &gateway.state,
        direct.id,
        Some("any-token"),
        &Identity::User(frank),
    )
    .await
    .unwrap_err();

    assert_eq!(denied, AdmissionDenied::NotAMember);
}
