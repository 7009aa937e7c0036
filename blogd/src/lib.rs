//! # blogd: a small blog backend
//!
//! `blogd` serves user registration and login plus post and comment CRUD over HTTP, backed by
//! PostgreSQL.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum); persistence uses SQLx
//! against PostgreSQL. A request flows through four layers:
//!
//! 1. **Handlers** ([`api::handlers`]) extract and check input. Malformed input is rejected with
//!    `400` before any service runs, and writes to posts require a bearer token.
//! 2. **Services** ([`services`]) implement the use cases. Anything that checks state and then
//!    writes runs inside one transaction.
//! 3. **Unit of work** ([`db::unit_of_work`]) owns that transaction: it hands the use case a
//!    store whose reads lock rows with `FOR UPDATE`, commits on success and rolls back on error.
//!    Commit and rollback failures are reported as distinct errors.
//! 4. **Repositories** ([`db::handlers`]) run the SQL against whatever connection they are given,
//!    whether that is a pooled connection or the open transaction.
//!
//! Only a post's author may update or delete it. The ownership check and the write happen under
//! the same row lock, so two concurrent updates of one post are applied one after the other.
//!
//! ## Sessions
//!
//! `POST /login` returns an 8-character token kept in an in-process [`auth::session::SessionStore`].
//! Sessions expire after `auth.session.ttl` and do not survive a restart.
//!
//! ## Configuration
//!
//! See [`config`] for the YAML file and `BLOGD_` environment variables.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument};

use crate::api::handlers::{auth as auth_handlers, comments, health, posts};
use crate::auth::{password::Passwords, session::SessionStore};
use crate::config::DatabaseConfig;
use crate::db::unit_of_work::UnitOfWork;
use crate::errors::Error;
use crate::services::{CommentService, PostService, UserService};

pub use config::Config;

/// Application state shared across all request handlers.
///
/// Every service shares one connection pool. The session store is shared between
/// [`UserService`] (which writes it at login) and the bearer-token extractor.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(pool, config);
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
}

impl AppState {
    /// Wire the services up over `db` as described by `config`.
    pub fn new(db: PgPool, config: Config) -> Self {
        let uow = UnitOfWork::new(db.clone(), config.database.transaction_timeout);
        let sessions = Arc::new(SessionStore::new(config.auth.session.ttl));
        let passwords = Passwords::new(config.auth.password.argon2_params());

        Self::builder()
            .users(UserService::new(uow.clone(), passwords, sessions.clone()))
            .posts(PostService::new(uow.clone()))
            .comments(CommentService::new(uow))
            .sessions(sessions)
            .db(db)
            .config(config)
            .build()
    }
}

/// Get the blogd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the connection pool with the configured limits.
async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let settings = &config.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .max_lifetime(settings.max_lifetime())
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Create CORS layer from configuration, `None` when no origins are allowed
fn create_cors_layer(config: &Config) -> anyhow::Result<Option<CorsLayer>> {
    let cors = &config.server.cors;
    if cors.allowed_origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if cors.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins = cors
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid CORS origin")?;
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(Duration::from_secs(max_age));
    }

    Ok(Some(layer))
}

/// Turn a failure raised by the middleware stack into the service's error shape.
async fn handle_middleware_error(request_timeout: Duration, err: BoxError) -> Error {
    if err.is::<tower::timeout::error::Elapsed>() {
        Error::RequestTimeout { after: request_timeout }
    } else {
        Error::Other(anyhow::anyhow!(err))
    }
}

/// Build the application router with all endpoints and middleware.
///
/// Requests are traced, and cancelled with `408` and a JSON error body when they run longer than
/// `server.request_timeout`. Cancelling a request drops any transaction it had open, which rolls
/// it back.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let mut router = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route(
            "/posts/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/healthz", get(health::healthz));

    // Middleware stack, outermost first
    let request_timeout = state.config.server.request_timeout;
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(HandleErrorLayer::new(move |err: BoxError| {
            handle_middleware_error(request_timeout, err)
        }))
        .layer(TimeoutLayer::new(request_timeout));
    router = router.layer(middleware);

    if let Some(cors) = create_cors_layer(&state.config)? {
        router = router.layer(cors);
    }

    Ok(router.with_state(state))
}

/// A configured server, ready to serve.
///
/// 1. **Create**: [`Application::new`] connects to the database, applies the schema and builds
///    the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests finish and the pool is
///    closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application over an existing pool, or a new one when `pool` is `None`
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting blogd with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config.database).await?,
        };
        migrator().run(&pool).await.context("Failed to apply database schema")?;

        let state = AppState::new(pool.clone(), config.clone());
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("blogd listening on http://{}", bind_addr);

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::models::{
        auth::LoginResponse,
        posts::{PostListResponse, PostResponse},
        users::UserResponse,
    };
    use crate::test_utils::{auth_header, create_test_app, create_test_config};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn register_and_login(server: &axum_test::TestServer, email: &str) -> (UserResponse, String) {
        let user: UserResponse = server
            .post("/register")
            .json(&json!({ "name": email, "email": email, "password": "password123" }))
            .await
            .json();
        let login: LoginResponse = server
            .post("/login")
            .json(&json!({ "email": email, "password": "password123" }))
            .await
            .json();
        (user, login.token)
    }

    /// Full flow over HTTP: two users, one post, a refused and an accepted edit.
    #[sqlx::test]
    #[test_log::test]
    async fn test_ownership_scenario(pool: PgPool) {
        let server = create_test_app(pool).await;
        let (author, author_token) = register_and_login(&server, "a@x.com").await;
        let (_, other_token) = register_and_login(&server, "b@x.com").await;

        let (name, value) = auth_header(&author_token);
        let post: PostResponse = server
            .post("/posts")
            .add_header(name, value)
            .json(&json!({ "title": "T", "content": "C" }))
            .await
            .json();
        assert_eq!(post.author_id, author.id);

        let path = format!("/posts/{}", post.id);
        let (name, value) = auth_header(&other_token);
        server
            .put(&path)
            .add_header(name, value)
            .json(&json!({ "title": "T2", "content": "C" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let (name, value) = auth_header(&author_token);
        server
            .put(&path)
            .add_header(name, value)
            .json(&json!({ "title": "T2", "content": "C" }))
            .await
            .assert_status_ok();

        let fetched: PostResponse = server.get(&path).await.json();
        assert_eq!(fetched.title, "T2");

        let listing: PostListResponse = server.get("/posts").await.json();
        assert_eq!(listing.total, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_app_state_shares_session_store(pool: PgPool) {
        let state = AppState::new(pool, create_test_config());
        let token = state.sessions.create(42);
        assert_eq!(state.users.authenticate(&token).unwrap(), 42);
    }

    #[tokio::test]
    async fn test_request_timeout_returns_error_body() {
        // A peer that accepts connections and never answers, so every query hangs
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(30))
            .connect_lazy(&format!("postgres://blogd@{addr}/blogd"))
            .unwrap();
        let mut config = create_test_config();
        config.server.request_timeout = Duration::from_millis(200);

        let router = build_router(AppState::new(pool, config)).unwrap();
        let server = axum_test::TestServer::new(router).unwrap();

        let response = server.get("/posts").await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);
        let body: serde_json::Value = response.json();
        assert_eq!(body, json!({ "error": "Request did not complete within 200ms" }));
    }

    #[test]
    fn test_cors_layer_configuration() {
        let mut config = create_test_config();
        assert!(create_cors_layer(&config).unwrap().is_none());

        config.server.cors.allowed_origins = vec!["*".to_string()];
        assert!(create_cors_layer(&config).unwrap().is_some());

        config.server.cors.allowed_origins = vec!["https://blog.example.com".to_string()];
        config.server.cors.max_age = Some(600);
        assert!(create_cors_layer(&config).unwrap().is_some());

        config.server.cors.allowed_origins = vec!["bad\norigin".to_string()];
        assert!(create_cors_layer(&config).is_err());
    }
}
