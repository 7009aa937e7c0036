//! Comment use cases.

use tracing::instrument;

use crate::db::{
    errors::DbError,
    handlers::{Repository, Store},
    models::comments::{CommentCreateDBRequest, CommentDBResponse},
    unit_of_work::UnitOfWork,
};
use crate::errors::{Error, Result};
use crate::types::PostId;

#[derive(Debug, Clone)]
pub struct CommentService {
    uow: UnitOfWork,
}

impl CommentService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Add a comment to an existing post.
    ///
    /// The post row stays locked until the comment is written, so it cannot be deleted in
    /// between.
    #[instrument(skip(self, author_name, content), err)]
    pub async fn create_comment(&self, post_id: PostId, author_name: String, content: String) -> Result<CommentDBResponse> {
        self.uow
            .run(move |store| {
                Box::pin(async move {
                    if store.posts().get_by_id(post_id).await?.is_none() {
                        return Err(Error::not_found("Post", post_id));
                    }

                    let request = CommentCreateDBRequest {
                        post_id,
                        author_name,
                        content,
                    };
                    Ok(store.comments().create(&request).await?)
                })
            })
            .await
    }

    /// Comments on an existing post, oldest first.
    #[instrument(skip(self), err)]
    pub async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentDBResponse>> {
        let mut conn = self.uow.pool().acquire().await.map_err(DbError::from)?;
        let mut store = Store::new(&mut conn);

        if store.posts().get_by_id(post_id).await?.is_none() {
            return Err(Error::not_found("Post", post_id));
        }
        let comments = store.comments().list(post_id).await?;
        Ok(comments)
    }
}
