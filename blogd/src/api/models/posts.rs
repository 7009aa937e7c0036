//! API request/response models for posts.

use crate::db::models::posts::PostDBResponse;
use crate::db::query::Page;
use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWrite {
    pub title: String,
    pub content: String,
}

/// Query string of `GET /posts`.
///
/// Every field is optional. A non-positive `author_id` lists every author's posts; `page` and
/// `size` are normalised by [`Page::new`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<UserId>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl ListPostsQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page.unwrap_or(1), self.size.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDBResponse> for PostResponse {
    fn from(db: PostDBResponse) -> Self {
        Self {
            id: db.id,
            author_id: db.author_id,
            title: db.title,
            content: db.content,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// One page of posts plus the number of posts matching the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub total: i64,
    pub data: Vec<PostResponse>,
}
