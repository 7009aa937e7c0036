//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//! - **[`extract`]**: Extractors that report malformed input as `400` with a JSON error body
//!
//! # Routes
//!
//! - **Authentication**: `POST /register`, `POST /login`
//! - **Posts**: `GET|POST /posts`, `GET|PUT|DELETE /posts/{id}`
//! - **Comments**: `GET|POST /posts/{id}/comments`
//! - **Health**: `GET /healthz`
//!
//! Writes to posts need an `Authorization: Bearer <token>` header from `POST /login`.

pub mod extract;
pub mod handlers;
pub mod models;
