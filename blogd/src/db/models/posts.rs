//! Database models for posts.

use crate::db::query::Page;
use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new post
#[derive(Debug, Clone)]
pub struct PostCreateDBRequest {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Database request for updating a post.
///
/// The update only applies to the row matching both the post id and `author_id`.
#[derive(Debug, Clone)]
pub struct PostUpdateDBRequest {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Database response for a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDBResponse {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing posts
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Only posts written by this user, when set
    pub author_id: Option<UserId>,
    pub page: Page,
}

impl PostFilter {
    pub fn new(author_id: Option<UserId>, page: Page) -> Self {
        Self { author_id, page }
    }
}
