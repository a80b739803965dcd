/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory application state with cheap password hashing
/// - Seeded users and a seeded tweet
/// - Request helpers that drive the router in-process

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use feedline_api::app::{build_router, AppState};
use feedline_api::config::Config;
use feedline_shared::auth::credentials::Registration;
use feedline_shared::db::memory::MemoryStorage;
use feedline_shared::models::UserId;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "test password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,

    /// doge@gmail.com, no tweets
    pub doge: UserId,

    /// inwu@gmail.com, has tweeted "Hi Hi"
    pub inwu: UserId,
}

/// Configuration for tests: in-memory storage, minimal Argon2 cost
pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "ARGON2_MEMORY_KIB" => Some("4096".to_string()),
        "ARGON2_ITERATIONS" => Some("1".to_string()),
        "ARGON2_PARALLELISM" => Some("1".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

impl TestContext {
    /// Creates a fresh application with two users and one tweet
    pub async fn new() -> anyhow::Result<Self> {
        let state = AppState::new(Arc::new(MemoryStorage::new()), test_config())?;

        let mut ids = Vec::new();
        for (email, name) in [("doge@gmail.com", "홍길동"), ("inwu@gmail.com", "김인우")] {
            let user = state
                .credentials
                .register(Registration {
                    email: email.to_string(),
                    name: name.to_string(),
                    profile: "test profile".to_string(),
                    password: TEST_PASSWORD.to_string(),
                })
                .await?;
            ids.push(user.id);
        }

        state.tweets.post(ids[1], "Hi Hi").await?;

        Ok(TestContext {
            app: build_router(state.clone()),
            state,
            doge: ids[0],
            inwu: ids[1],
        })
    }

    /// Sends a request and returns the status and the body parsed as JSON
    ///
    /// Non-JSON bodies come back as a JSON string; empty bodies as `null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Logs in and returns the raw access token
    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/login",
                None,
                serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"]
            .as_str()
            .expect("access_token in login response")
            .to_string()
    }
}
