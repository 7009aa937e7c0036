//! API request and response data models.
//!
//! These structures define the public JSON contract. They are distinct from the database
//! models in [`crate::db::models`], with `From` conversions from the storage types.
//!
//! - [`auth`]: Registration and login bodies, the login token response
//! - [`users`]: The public view of a user
//! - [`posts`]: Post bodies, the list query and the paginated list response
//! - [`comments`]: Comment bodies and the per-post comment listing

pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;
