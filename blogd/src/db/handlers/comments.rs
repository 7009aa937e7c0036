//! Database repository for comments.

use crate::db::{
    errors::Result,
    models::comments::{CommentCreateDBRequest, CommentDBResponse},
    query::select_query,
};
use crate::types::{CommentId, PostId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const COMMENT_COLUMNS: &str = "id, post_id, author_name, content, created_at";

#[derive(Debug, Clone, FromRow)]
struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDBResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_name: comment.author_name,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

pub struct Comments<'c> {
    db: &'c mut PgConnection,
    for_update: bool,
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db, for_update: false }
    }

    pub fn with_lock(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }

    /// All comments on a post, oldest first.
    #[instrument(skip(self), fields(for_update = self.for_update), err)]
    pub async fn list(&mut self, post_id: PostId) -> Result<Vec<CommentDBResponse>> {
        let sql = select_query(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY id"),
            self.for_update,
        );
        let comments = sqlx::query_as::<_, Comment>(&sql).bind(post_id).fetch_all(&mut *self.db).await?;

        Ok(comments.into_iter().map(CommentDBResponse::from).collect())
    }

    #[instrument(skip(self, request), fields(post_id = request.post_id), err)]
    pub async fn create(&mut self, request: &CommentCreateDBRequest) -> Result<CommentDBResponse> {
        let sql = format!("INSERT INTO comments (post_id, author_name, content) VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}");
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(request.post_id)
            .bind(&request.author_name)
            .bind(&request.content)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(CommentDBResponse::from(comment))
    }
}
