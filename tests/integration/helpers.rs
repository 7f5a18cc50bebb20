//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tower::ServiceExt;
use uuid::Uuid;

use keystone_api::{AppState, build_app};
use keystone_auth::jwt::TokenIssuer;
use keystone_auth::password::PasswordHasher;
use keystone_core::config::{AppConfig, AuthConfig, DatabaseConfig, DatabaseDriver};
use keystone_core::events::Notice;
use keystone_database::provider::AccountStore;
use keystone_database::repositories::{AccountRepository, MemoryAccountRepository};
use keystone_entity::account::{Account, CreateAccount};
use keystone_service::notification::NotificationQueue;

/// A password the default strength policy accepts.
pub const STRONG_PASSWORD: &str = "violet-anchor-91-meadow";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Repository behind the router, for seeding and inspection
    pub repo: Arc<MemoryAccountRepository>,
    /// Hasher with the same parameters the app uses
    pub hasher: PasswordHasher,
    /// Token issuer sharing the app's secret
    pub tokens: TokenIssuer,
    /// Notices the app has queued
    notices: Mutex<mpsc::Receiver<Notice>>,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_repository(|repo| repo)
    }

    /// Create a test application whose handlers see the memory repository
    /// through `wrap`. Seeding and inspection still go to the memory store.
    pub fn with_repository<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<MemoryAccountRepository>) -> Arc<dyn AccountRepository>,
    {
        let config = AppConfig {
            database: DatabaseConfig {
                driver: DatabaseDriver::Memory,
                ..DatabaseConfig::default()
            },
            auth: AuthConfig {
                jwt_secret: "integration-test-secret".to_string(),
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        };

        let repo = Arc::new(MemoryAccountRepository::new());
        let store = AccountStore {
            repository: wrap(repo.clone()),
            pool: None,
        };
        let (queue, notices) = NotificationQueue::new(64);

        let state = AppState::new(config.clone(), store, Arc::new(queue))
            .expect("Failed to build app state");

        Self {
            router: build_app(state),
            repo,
            hasher: PasswordHasher::new(&config.auth).expect("Failed to build hasher"),
            tokens: TokenIssuer::new(&config.auth),
            notices: Mutex::new(notices),
        }
    }

    /// Insert an account directly and return it
    pub async fn seed_account(&self, username: &str, password: &str) -> Account {
        self.seed_with_ban(username, password, None, None).await
    }

    /// Insert an account with ban state and return it
    pub async fn seed_with_ban(
        &self,
        username: &str,
        password: &str,
        banned_until: Option<DateTime<Utc>>,
        ban_reason: Option<&str>,
    ) -> Account {
        let hash = self
            .hasher
            .hash_password(password)
            .expect("Failed to hash password");

        let mut account = CreateAccount {
            username: username.to_string(),
            email: None,
            password_hash: hash,
        }
        .into_account(Uuid::new_v4(), Utc::now());
        account.banned_until = banned_until;
        account.ban_reason = ban_reason.map(String::from);

        self.repo
            .seed(account.clone())
            .await
            .expect("Failed to seed account");
        account
    }

    /// Login and return the session token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {}",
            response.text
        );

        response
            .body
            .get("token")
            .and_then(|v| v.as_str())
            .expect("No token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            body,
            text,
        }
    }

    /// Wait for the next queued notice
    pub async fn next_notice(&self) -> Notice {
        let mut notices = self.notices.lock().await;
        tokio::time::timeout(Duration::from_secs(5), notices.recv())
            .await
            .expect("No notice queued in time")
            .expect("Notification queue closed")
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header, empty if absent
    pub content_type: String,
    /// Parsed JSON body, `Null` if not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
}
