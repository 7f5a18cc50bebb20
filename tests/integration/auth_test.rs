//! Integration tests for login and registration.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use keystone_core::events::Notice;
use keystone_core::{AppError, AppResult, ErrorKind};
use keystone_database::repositories::{AccountRepository, MemoryAccountRepository};
use keystone_entity::account::{Account, CreateAccount, Feature};

use crate::helpers::{STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success_returns_resolvable_token() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;

    let token = app.login("alice", "correct-pw").await;
    assert!(!token.is_empty());
    assert_eq!(app.tokens.resolve(&token).unwrap(), alice.id);

    let stored = app.repo.get_by_username("alice").await.unwrap();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_records_forwarded_address() {
    let app = TestApp::new();
    app.seed_account("alice", "correct-pw").await;

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", "203.0.113.9, 10.0.0.2")
        .body(Body::from(
            json!({ "username": "alice", "password": "correct-pw" }).to_string(),
        ))
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::OK);

    let stored = app.repo.get_by_username("alice").await.unwrap();
    assert_eq!(stored.last_login_ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = TestApp::new();
    app.seed_account("alice", "correct-pw").await;

    let wrong = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "username": "alice", "password": "wrong-pw" })),
            None,
        )
        .await;
    let ghost = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "username": "ghost", "password": "anything" })),
            None,
        )
        .await;

    for response in [&wrong, &ghost] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.text, "invalid credentials");
        assert!(response.content_type.starts_with("text/plain"));
    }
    assert_eq!(wrong.text, ghost.text);
}

#[tokio::test]
async fn test_login_malformed_body_is_bad_request() {
    let app = TestApp::new();

    let missing_field = app
        .request("POST", "/auth/login", Some(json!({ "username": "alice" })), None)
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);

    let empty_fields = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "username": "", "password": "" })),
            None,
        )
        .await;
    assert_eq!(empty_fields.status, StatusCode::BAD_REQUEST);

    let not_json = app.request("POST", "/auth/login", None, None).await;
    assert_eq!(not_json.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_banned_account_with_correct_password() {
    let app = TestApp::new();
    app.seed_with_ban(
        "banned",
        "banned",
        Some(Utc::now() + Duration::days(365)),
        Some("banned"),
    )
    .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "username": "banned", "password": "banned" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body,
        json!({ "message": "user is banned", "reason": "banned" })
    );
}

#[tokio::test]
async fn test_banned_account_with_wrong_password_hides_ban() {
    let app = TestApp::new();
    app.seed_with_ban(
        "banned",
        "banned",
        Some(Utc::now() + Duration::days(365)),
        Some("banned"),
    )
    .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "username": "banned", "password": "nope" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.text, "invalid credentials");
}

#[tokio::test]
async fn test_expired_ban_allows_login() {
    let app = TestApp::new();
    app.seed_with_ban(
        "paroled",
        "correct-pw",
        Some(Utc::now() - Duration::days(1)),
        Some("old"),
    )
    .await;

    app.login("paroled", "correct-pw").await;
}

#[tokio::test]
async fn test_register_creates_account_and_queues_activation() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "New.User@Example.com", "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["username"], "new.user@example.com");
    assert!(response.body.get("token").is_none());

    let stored = app
        .repo
        .get_by_username("new.user@example.com")
        .await
        .unwrap();
    assert!(app.hasher.verify_password(STRONG_PASSWORD, &stored.password_hash));

    match app.next_notice().await {
        Notice::Activation(notice) => {
            assert_eq!(notice.account_id, stored.id);
            assert_eq!(notice.email, "new.user@example.com");
        }
        other => panic!("unexpected notice {other:?}"),
    }

    app.login("new.user@example.com", STRONG_PASSWORD).await;
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let app = TestApp::new();
    let body = json!({ "email": "dup@example.com", "password": STRONG_PASSWORD });

    let first = app
        .request("POST", "/auth/register", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.request("POST", "/auth/register", Some(body), None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_non_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "test", "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["details"]["email"].is_array());
    assert_eq!(
        app.repo.get_by_username("test").await.unwrap_err().kind,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new();

    for password in ["short", "password"] {
        let response = app
            .request(
                "POST",
                "/auth/register",
                Some(json!({ "email": "weak@example.com", "password": password })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{password}");
        assert!(response.body["details"]["password"].is_array());
    }
    assert!(app.repo.is_empty().await);
}

#[tokio::test]
async fn test_login_with_registered_email_as_typed() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "New.User@Example.com", "password": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let token = app.login("New.User@Example.com", STRONG_PASSWORD).await;
    let stored = app
        .repo
        .get_by_username("new.user@example.com")
        .await
        .unwrap();
    assert_eq!(app.tokens.resolve(&token).unwrap(), stored.id);
}

/// Memory repository whose last-login bookkeeping always fails.
struct BrokenLastLogin(Arc<MemoryAccountRepository>);

#[async_trait]
impl AccountRepository for BrokenLastLogin {
    async fn get_by_username(&self, username: &str) -> AppResult<Account> {
        self.0.get_by_username(username).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Account> {
        self.0.get_by_id(id).await
    }

    async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        self.0.create(data).await
    }

    async fn change_username(&self, id: Uuid, username: &str) -> AppResult<Account> {
        self.0.change_username(id, username).await
    }

    async fn change_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        self.0.change_password(id, password_hash).await
    }

    async fn update_last_login(&self, _id: Uuid, _address: Option<&str>) -> AppResult<()> {
        Err(AppError::database("connection reset by peer"))
    }

    async fn add_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        self.0.add_feature(id, feature).await
    }

    async fn remove_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        self.0.remove_feature(id, feature).await
    }
}

#[tokio::test]
async fn test_login_survives_last_login_failure() {
    let app = TestApp::with_repository(|repo| Arc::new(BrokenLastLogin(repo)));
    let alice = app.seed_account("alice", "correct-pw").await;

    let token = app.login("alice", "correct-pw").await;
    assert_eq!(app.tokens.resolve(&token).unwrap(), alice.id);

    let me = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["id"], alice.id.to_string());

    let stored = app.repo.get_by_username("alice").await.unwrap();
    assert!(stored.last_login_at.is_none());
}
