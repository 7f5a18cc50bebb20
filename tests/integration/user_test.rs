//! Integration tests for the authenticated account endpoints.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use keystone_auth::jwt::Claims;
use keystone_core::events::Notice;
use keystone_core::ErrorKind;
use keystone_database::repositories::AccountRepository;

use crate::helpers::{STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_get_user_returns_snapshot_without_hash() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app.request("GET", "/api/user", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let user = &response.body["user"];
    assert_eq!(user["id"], alice.id.to_string());
    assert_eq!(user["username"], "alice");
    assert_eq!(user["features"], json!([]));
    assert!(user["createdAt"].is_string());
    assert!(user["lastLoginAt"].is_string());
    assert!(!response.text.contains("argon2"));
    assert!(!response.text.to_lowercase().contains("password"));
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;

    let missing = app.request("GET", "/api/user", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/user", None, Some("not-a-token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let expired = app
        .tokens
        .sign(&Claims::new(
            alice.id,
            Utc::now() - Duration::hours(3),
            Duration::hours(1),
        ))
        .unwrap();
    let response = app.request("GET", "/api/user", None, Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let orphan = app.tokens.issue(Uuid::new_v4()).unwrap();
    let response = app
        .request(
            "PATCH",
            "/api/user/username",
            Some(json!({ "username": "someone" })),
            Some(&orphan),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_username() {
    let app = TestApp::new();
    app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app
        .request(
            "PATCH",
            "/api/user/username",
            Some(json!({ "username": "alice.w" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["username"], "alice.w");

    let old = app.repo.get_by_username("alice").await.unwrap_err();
    assert_eq!(old.kind, ErrorKind::NotFound);
    app.repo.get_by_username("alice.w").await.unwrap();

    app.login("alice.w", "correct-pw").await;
}

#[tokio::test]
async fn test_change_username_to_taken_name_conflicts() {
    let app = TestApp::new();
    app.seed_account("alice", "correct-pw").await;
    app.seed_account("bob", "bob-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app
        .request(
            "PATCH",
            "/api/user/username",
            Some(json!({ "username": "bob" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    app.repo.get_by_username("alice").await.unwrap();
}

#[tokio::test]
async fn test_change_username_validates_shape() {
    let app = TestApp::new();
    app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    for username in ["ab", "has space", "semi;colon"] {
        let response = app
            .request(
                "PATCH",
                "/api/user/username",
                Some(json!({ "username": username })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{username}");
        assert!(response.body["details"]["username"].is_array());
    }
}

#[tokio::test]
async fn test_change_password_with_wrong_current_is_unauthorized() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app
        .request(
            "PATCH",
            "/api/user/password",
            Some(json!({ "password": "wrong-pw", "newPassword": STRONG_PASSWORD })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let stored = app.repo.get_by_id(alice.id).await.unwrap();
    assert_eq!(stored.password_hash, alice.password_hash);
}

#[tokio::test]
async fn test_change_password_success() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app
        .request(
            "PATCH",
            "/api/user/password",
            Some(json!({ "password": "correct-pw", "newPassword": STRONG_PASSWORD })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);

    let stored = app.repo.get_by_id(alice.id).await.unwrap();
    assert!(app.hasher.verify_password(STRONG_PASSWORD, &stored.password_hash));
    assert!(!app.hasher.verify_password("correct-pw", &stored.password_hash));

    match app.next_notice().await {
        Notice::PasswordChanged(notice) => assert_eq!(notice.account_id, alice.id),
        other => panic!("unexpected notice {other:?}"),
    }

    app.login("alice", STRONG_PASSWORD).await;
}

#[tokio::test]
async fn test_change_password_enforces_policy() {
    let app = TestApp::new();
    let alice = app.seed_account("alice", "correct-pw").await;
    let token = app.login("alice", "correct-pw").await;

    let response = app
        .request(
            "PATCH",
            "/api/user/password",
            Some(json!({ "password": "correct-pw", "newPassword": "short" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let stored = app.repo.get_by_id(alice.id).await.unwrap();
    assert_eq!(stored.password_hash, alice.password_hash);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "ok" }));
}
