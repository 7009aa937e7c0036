//! HTTP request handlers for all API endpoints.
//!
//! Handlers extract and check input, call into [`crate::services`], and convert the result into
//! an API model. Errors are returned as [`crate::errors::Error`], which renders the status code
//! and a `{"error": "..."}` body.
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration and login
//! - [`posts`]: Post listing, lookup, and the owner-only create/update/delete
//! - [`comments`]: Listing and adding comments on a post
//! - [`health`]: Liveness probe
//!
//! # Authentication
//!
//! Handlers that change posts take an [`AuthenticatedUser`](crate::auth::current_user::AuthenticatedUser)
//! argument, which rejects the request with `401` before the handler runs.

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
