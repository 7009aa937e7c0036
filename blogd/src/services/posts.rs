//! Post use cases.

use sqlx::{Postgres, pool::PoolConnection};
use tracing::instrument;

use crate::db::{
    errors::DbError,
    handlers::{Repository, Store},
    models::posts::{PostCreateDBRequest, PostDBResponse, PostFilter, PostUpdateDBRequest},
    query::Page,
    unit_of_work::UnitOfWork,
};
use crate::errors::{Error, Result};
use crate::types::{Operation, PostId, UserId};

#[derive(Debug, Clone)]
pub struct PostService {
    uow: UnitOfWork,
}

impl PostService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    async fn connection(&self) -> Result<PoolConnection<Postgres>> {
        Ok(self.uow.pool().acquire().await.map_err(DbError::from)?)
    }

    /// Publish a post. The author must exist.
    #[instrument(skip(self, title, content), err)]
    pub async fn create_post(&self, author_id: UserId, title: String, content: String) -> Result<PostDBResponse> {
        self.uow
            .run(move |store| {
                Box::pin(async move {
                    if store.users().get_by_id(author_id).await?.is_none() {
                        return Err(Error::not_found("User", author_id));
                    }

                    let request = PostCreateDBRequest { author_id, title, content };
                    Ok(store.posts().create(&request).await?)
                })
            })
            .await
    }

    /// Replace a post's title and content. Only its author may do this.
    #[instrument(skip(self, title, content), err)]
    pub async fn update_post(&self, id: PostId, requester_id: UserId, title: String, content: String) -> Result<PostDBResponse> {
        self.uow
            .run(move |store| {
                Box::pin(async move {
                    check_owner(store, id, requester_id, Operation::Update).await?;

                    let request = PostUpdateDBRequest {
                        author_id: requester_id,
                        title,
                        content,
                    };
                    // The row is locked and owned by the requester, so the update always matches
                    store
                        .posts()
                        .update(id, &request)
                        .await?
                        .ok_or_else(|| Error::not_found("Post", id))
                })
            })
            .await
    }

    /// Remove a post and its comments. Only its author may do this.
    #[instrument(skip(self), err)]
    pub async fn delete_post(&self, id: PostId, requester_id: UserId) -> Result<()> {
        self.uow
            .run(move |store| {
                Box::pin(async move {
                    check_owner(store, id, requester_id, Operation::Delete).await?;

                    if !store.posts().delete(id, requester_id).await? {
                        return Err(Error::not_found("Post", id));
                    }
                    Ok(())
                })
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn get_post(&self, id: PostId) -> Result<PostDBResponse> {
        let mut conn = self.connection().await?;
        let post = Store::new(&mut conn).posts().get_by_id(id).await?;
        post.ok_or_else(|| Error::not_found("Post", id))
    }

    /// One page of posts in insertion order and the number of posts matching the filter.
    ///
    /// An `author_id` of zero or below means "every author".
    #[instrument(skip(self), err)]
    pub async fn list_posts(&self, author_id: Option<UserId>, page: Page) -> Result<(Vec<PostDBResponse>, i64)> {
        let filter = PostFilter::new(author_id.filter(|id| *id > 0), page);
        let mut conn = self.connection().await?;
        let listing = Store::new(&mut conn).posts().list(&filter).await?;
        Ok(listing)
    }
}

/// Lock the post and make sure `requester_id` wrote it.
async fn check_owner(store: &mut Store<'_>, id: PostId, requester_id: UserId, operation: Operation) -> Result<()> {
    let post = store.posts().get_by_id(id).await?.ok_or_else(|| Error::not_found("Post", id))?;
    if post.author_id != requester_id {
        return Err(Error::not_authorized(operation, "Post", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;
    use std::time::Duration;

    fn service(pool: &PgPool) -> PostService {
        PostService::new(UnitOfWork::new(pool.clone(), Duration::from_secs(10)))
    }

    async fn create_user(pool: &PgPool, email: &str) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                name: "Writer".to_string(),
                email: email.to_string(),
                password_hash: "digest".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn count_posts(pool: &PgPool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts").fetch_one(pool).await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_post_requires_author(pool: PgPool) {
        let service = service(&pool);

        let err = service.create_post(404, "T".to_string(), "C".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref resource, .. } if resource == "User"), "unexpected error: {err:?}");
        assert_eq!(count_posts(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_posts_bounds_and_totals(pool: PgPool) {
        let service = service(&pool);
        let alice = create_user(&pool, "alice@example.com").await;
        let bob = create_user(&pool, "bob@example.com").await;
        for n in 0..7 {
            service.create_post(alice, format!("A{n}"), "C".to_string()).await.unwrap();
        }
        for n in 0..3 {
            service.create_post(bob, format!("B{n}"), "C".to_string()).await.unwrap();
        }

        for page in 1..=4 {
            for size in 1..=4 {
                let (items, total) = service.list_posts(Some(alice), Page::new(page, size)).await.unwrap();
                assert!(items.len() as i64 <= size);
                assert_eq!(total, 7, "total must not depend on the window");
                assert!(items.iter().all(|p| p.author_id == alice));
            }
        }

        let (_, total) = service.list_posts(None, Page::new(5, 2)).await.unwrap();
        assert_eq!(total, 10);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_posts_normalises_window_and_filter(pool: PgPool) {
        let service = service(&pool);
        let author = create_user(&pool, "norm@example.com").await;
        for n in 0..12 {
            service.create_post(author, format!("P{n}"), "C".to_string()).await.unwrap();
        }

        let first = service.list_posts(None, Page::new(1, 10)).await.unwrap();
        assert_eq!(service.list_posts(None, Page::new(0, 10)).await.unwrap(), first);
        assert_eq!(service.list_posts(None, Page::new(-5, 10)).await.unwrap(), first);
        assert_eq!(service.list_posts(None, Page::new(1, 0)).await.unwrap(), first);
        assert_eq!(service.list_posts(None, Page::new(1, -1)).await.unwrap(), first);
        assert_eq!(first.0.len(), 10);

        // Non-positive author ids mean "no filter"
        assert_eq!(service.list_posts(Some(0), Page::new(1, 10)).await.unwrap(), first);
        assert_eq!(service.list_posts(Some(-1), Page::new(1, 10)).await.unwrap(), first);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_non_owner_cannot_change_post(pool: PgPool) {
        let service = service(&pool);
        let owner = create_user(&pool, "owner@example.com").await;
        let intruder = create_user(&pool, "intruder@example.com").await;
        let post = service.create_post(owner, "T".to_string(), "C".to_string()).await.unwrap();

        let err = service
            .update_post(post.id, intruder, "X".to_string(), "Y".to_string())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::NotAuthorized { operation: Operation::Update, .. }),
            "unexpected error: {err:?}"
        );

        let err = service.delete_post(post.id, intruder).await.unwrap_err();
        assert!(
            matches!(err, Error::NotAuthorized { operation: Operation::Delete, .. }),
            "unexpected error: {err:?}"
        );

        assert_eq!(service.get_post(post.id).await.unwrap(), post);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_post_is_not_found(pool: PgPool) {
        let service = service(&pool);
        let user = create_user(&pool, "ghost@example.com").await;

        assert!(matches!(service.get_post(99).await, Err(Error::NotFound { .. })));
        assert!(matches!(
            service.update_post(99, user, "T".to_string(), "C".to_string()).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(service.delete_post(99, user).await, Err(Error::NotFound { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_can_delete_post(pool: PgPool) {
        let service = service(&pool);
        let owner = create_user(&pool, "deleter@example.com").await;
        let post = service.create_post(owner, "T".to_string(), "C".to_string()).await.unwrap();

        service.delete_post(post.id, owner).await.unwrap();
        assert!(matches!(service.get_post(post.id).await, Err(Error::NotFound { .. })));
        assert!(matches!(service.delete_post(post.id, owner).await, Err(Error::NotFound { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_concurrent_updates_leave_one_whole_value(pool: PgPool) {
        let service = service(&pool);
        let owner = create_user(&pool, "racer@example.com").await;
        let post = service.create_post(owner, "T".to_string(), "C".to_string()).await.unwrap();

        let (first, second) = tokio::join!(
            service.update_post(post.id, owner, "Left".to_string(), "left content".to_string()),
            service.update_post(post.id, owner, "Right".to_string(), "right content".to_string()),
        );
        first.unwrap();
        second.unwrap();

        let stored = service.get_post(post.id).await.unwrap();
        match stored.title.as_str() {
            "Left" => assert_eq!(stored.content, "left content"),
            "Right" => assert_eq!(stored.content, "right content"),
            other => panic!("unexpected title {other}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_waits_for_row_lock(pool: PgPool) {
        let service = service(&pool);
        let owner = create_user(&pool, "waiter@example.com").await;
        let post = service.create_post(owner, "T".to_string(), "C".to_string()).await.unwrap();

        // Hold the row lock in a transaction of our own
        let mut tx = pool.begin().await.unwrap();
        Store::locking(&mut tx).posts().get_by_id(post.id).await.unwrap().unwrap();

        let waiting = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .update_post(post.id, owner, "Second".to_string(), "second".to_string())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!waiting.is_finished(), "update must wait behind the lock holder");

        let first = PostUpdateDBRequest {
            author_id: owner,
            title: "First".to_string(),
            content: "first".to_string(),
        };
        Store::locking(&mut tx).posts().update(post.id, &first).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        let updated = waiting.await.unwrap().unwrap();
        assert_eq!(updated.title, "Second");
        assert_eq!(service.get_post(post.id).await.unwrap().content, "second");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_ownership_scenario(pool: PgPool) {
        let service = service(&pool);
        let author = create_user(&pool, "a@x.com").await;
        let other = create_user(&pool, "b@x.com").await;

        let post = service.create_post(author, "T".to_string(), "C".to_string()).await.unwrap();
        assert_eq!(post.author_id, author);

        let err = service
            .update_post(post.id, other, "T2".to_string(), "C".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthorized { .. }));

        service
            .update_post(post.id, author, "T2".to_string(), "C".to_string())
            .await
            .unwrap();
        assert_eq!(service.get_post(post.id).await.unwrap().title, "T2");
    }
}
