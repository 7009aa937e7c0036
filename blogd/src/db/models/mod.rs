//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept apart from the API
//! models in [`crate::api::models`] so the storage and wire representations can change
//! independently; conversions live next to the API types.
//!
//! - [`users`]: User accounts and password digests
//! - [`posts`]: Posts and the list filter
//! - [`comments`]: Comments on posts

pub mod comments;
pub mod posts;
pub mod users;
