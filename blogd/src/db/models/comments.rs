//! Database models for comments.

use crate::types::{CommentId, PostId};
use chrono::{DateTime, Utc};

/// Database request for creating a comment
#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub post_id: PostId,
    pub author_name: String,
    pub content: String,
}

/// Database response for a comment
#[derive(Debug, Clone)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
