//! Database repository for posts.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::posts::{PostCreateDBRequest, PostDBResponse, PostFilter, PostUpdateDBRequest},
    query::{count_query, pagination_query, select_query},
};
use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const POST_COLUMNS: &str = "id, author_id, title, content, created_at, updated_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostDBResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

pub struct Posts<'c> {
    db: &'c mut PgConnection,
    for_update: bool,
}

#[async_trait::async_trait]
impl<'c> Repository for Posts<'c> {
    type CreateRequest = PostCreateDBRequest;
    type Response = PostDBResponse;
    type Id = PostId;

    #[instrument(skip(self, request), fields(author_id = request.author_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!("INSERT INTO posts (author_id, title, content) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(request.author_id)
            .bind(&request.title)
            .bind(&request.content)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(PostDBResponse::from(post))
    }

    #[instrument(skip(self), fields(for_update = self.for_update), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = select_query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"), self.for_update);
        let post = sqlx::query_as::<_, Post>(&sql).bind(id).fetch_optional(&mut *self.db).await?;

        Ok(post.map(PostDBResponse::from))
    }
}

impl<'c> Posts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db, for_update: false }
    }

    /// Make every read lock the rows it returns until the enclosing transaction ends.
    pub fn with_lock(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }

    /// List one page of posts in insertion order, plus the number of posts matching the filter.
    ///
    /// The total is counted over the filtered selection, so it does not depend on the window.
    #[instrument(skip(self, filter), fields(author_id = ?filter.author_id, page = filter.page.page(), size = filter.page.size()), err)]
    pub async fn list(&mut self, filter: &PostFilter) -> Result<(Vec<PostDBResponse>, i64)> {
        let mut base = format!("SELECT {POST_COLUMNS} FROM posts");
        if filter.author_id.is_some() {
            base.push_str(" WHERE author_id = $1");
        }

        let count_sql = count_query(&base);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(author_id) = filter.author_id {
            count = count.bind(author_id);
        }
        let total = count.fetch_one(&mut *self.db).await?;

        let page_sql = select_query(&pagination_query(&format!("{base} ORDER BY id"), filter.page), self.for_update);
        let mut rows = sqlx::query_as::<_, Post>(&page_sql);
        if let Some(author_id) = filter.author_id {
            rows = rows.bind(author_id);
        }
        let posts = rows.fetch_all(&mut *self.db).await?;

        Ok((posts.into_iter().map(PostDBResponse::from).collect(), total))
    }

    /// Update the post matching both `id` and `request.author_id`.
    ///
    /// Returns `None` when no row matched; a mismatched author is not an error here.
    #[instrument(skip(self, request), fields(author_id = request.author_id), err)]
    pub async fn update(&mut self, id: PostId, request: &PostUpdateDBRequest) -> Result<Option<PostDBResponse>> {
        let sql = format!(
            "UPDATE posts SET title = $1, content = $2, updated_at = NOW() WHERE id = $3 AND author_id = $4 RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&request.title)
            .bind(&request.content)
            .bind(id)
            .bind(request.author_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(post.map(PostDBResponse::from))
    }

    /// Delete the post matching both `id` and `author_id`. Returns whether a row was removed.
    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: PostId, author_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use crate::db::query::Page;
    use sqlx::PgPool;

    async fn create_author(conn: &mut PgConnection, email: &str) -> UserId {
        let request = UserCreateDBRequest {
            name: "Author".to_string(),
            email: email.to_string(),
            password_hash: "digest".to_string(),
        };
        Users::new(conn).create(&request).await.unwrap().id
    }

    fn post_request(author_id: UserId, n: usize) -> PostCreateDBRequest {
        PostCreateDBRequest {
            author_id,
            title: format!("Post {n}"),
            content: format!("Content {n}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_post(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author_id = create_author(&mut conn, "author@example.com").await;

        let mut repo = Posts::new(&mut conn);
        let created = repo.create(&post_request(author_id, 1)).await.unwrap();
        assert_eq!(created.author_id, author_id);
        assert_eq!(created.title, "Post 1");
        assert_eq!(created.content, "Content 1");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_post_for_missing_author_is_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let err = Posts::new(&mut conn).create(&post_request(9999, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "unexpected error: {err:?}");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_pages_and_total(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author_id = create_author(&mut conn, "pager@example.com").await;

        let mut repo = Posts::new(&mut conn);
        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(repo.create(&post_request(author_id, n)).await.unwrap().id);
        }

        let (first, total) = repo.list(&PostFilter::new(None, Page::new(1, 2))).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(first.iter().map(|p| p.id).collect::<Vec<_>>(), ids[0..2]);

        let (last, total) = repo.list(&PostFilter::new(None, Page::new(3, 2))).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(last.iter().map(|p| p.id).collect::<Vec<_>>(), ids[4..5]);

        let (beyond, total) = repo.list(&PostFilter::new(None, Page::new(4, 2))).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_author(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = create_author(&mut conn, "alice@example.com").await;
        let bob = create_author(&mut conn, "bob@example.com").await;

        let mut repo = Posts::new(&mut conn);
        for n in 0..3 {
            repo.create(&post_request(alice, n)).await.unwrap();
        }
        repo.create(&post_request(bob, 10)).await.unwrap();

        let (posts, total) = repo.list(&PostFilter::new(Some(alice), Page::new(1, 2))).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.author_id == alice));

        let (_, total) = repo.list(&PostFilter::new(None, Page::default())).await.unwrap();
        assert_eq!(total, 4);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete_match_author(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_author(&mut conn, "owner@example.com").await;
        let other = create_author(&mut conn, "other@example.com").await;

        let mut repo = Posts::new(&mut conn);
        let post = repo.create(&post_request(owner, 1)).await.unwrap();

        let wrong_author = PostUpdateDBRequest {
            author_id: other,
            title: "Hijacked".to_string(),
            content: "nope".to_string(),
        };
        assert!(repo.update(post.id, &wrong_author).await.unwrap().is_none());
        assert!(!repo.delete(post.id, other).await.unwrap());
        assert_eq!(repo.get_by_id(post.id).await.unwrap().unwrap().title, "Post 1");

        let update = PostUpdateDBRequest {
            author_id: owner,
            title: "Edited".to_string(),
            content: "Edited content".to_string(),
        };
        let updated = repo.update(post.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.content, "Edited content");
        assert!(updated.updated_at >= post.updated_at);

        assert!(repo.delete(post.id, owner).await.unwrap());
        assert!(repo.get_by_id(post.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_locking_list_inside_transaction(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();
        let author_id = create_author(&mut tx, "locker@example.com").await;
        Posts::new(&mut tx).create(&post_request(author_id, 1)).await.unwrap();

        let mut repo = Posts::new(&mut tx).with_lock(true);
        let (posts, total) = repo.list(&PostFilter::new(Some(author_id), Page::default())).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(posts.len(), 1);

        tx.rollback().await.unwrap();
    }
}
