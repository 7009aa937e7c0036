//! Test utilities for integration testing (available with `test-utils` feature).

use crate::AppState;
use crate::api::models::{auth::LoginResponse, posts::PostResponse, users::UserResponse};
use crate::config::{Config, PasswordConfig};
use crate::types::UserId;
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;

/// Password every user made by [`create_test_user`] logs in with.
pub const TEST_PASSWORD: &str = "test-password";

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

/// Defaults with cheap password hashing and short deadlines.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.database.transaction_timeout = Duration::from_secs(10);
    config.server.request_timeout = Duration::from_secs(30);
    config.auth.password = PasswordConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..PasswordConfig::default()
    };
    config
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(pool, create_test_config())
}

/// Register a user with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, email: &str) -> UserResponse {
    let state = create_test_state(pool.clone());
    let user = state
        .users
        .register("Test User".to_string(), email.to_string(), TEST_PASSWORD.to_string())
        .await
        .expect("Failed to create test user");
    UserResponse::from(user)
}

/// Log in over HTTP and return the session token.
pub async fn login_test_user(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>().token
}

pub async fn create_test_post(pool: &PgPool, author_id: UserId) -> PostResponse {
    let state = create_test_state(pool.clone());
    let post = state
        .posts
        .create_post(author_id, "Test post".to_string(), "Test content".to_string())
        .await
        .expect("Failed to create test post");
    PostResponse::from(post)
}

pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("Token is a valid header value");
    (AUTHORIZATION, value)
}
