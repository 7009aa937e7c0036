//! API request/response models for comments.

use crate::db::models::comments::CommentDBResponse;
use crate::types::PostId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /posts/{id}/comments`. Commenters are not accounts, just a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreate {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentDBResponse> for CommentResponse {
    fn from(db: CommentDBResponse) -> Self {
        Self {
            author: db.author_name,
            content: db.content,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCommentsResponse {
    pub post_id: PostId,
    pub comments: Vec<CommentResponse>,
}
