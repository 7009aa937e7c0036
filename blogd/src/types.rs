//! Common type definitions.
//!
//! # ID Types
//!
//! Entity IDs are `BIGSERIAL` keys assigned by the database, wrapped in type aliases so
//! signatures say which entity they refer to:
//!
//! - [`UserId`]: User account identifier
//! - [`PostId`]: Post identifier
//! - [`CommentId`]: Comment identifier
//!
//! # Operations
//!
//! [`Operation`] names the ownership-gated actions a user can attempt on a post. It only
//! exists so that authorization errors can say what was refused.

use std::fmt;

// Type aliases for IDs
pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;

// Ownership-gated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
