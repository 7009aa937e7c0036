use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{
        extract::{JsonBody, PathParam},
        models::comments::{CommentCreate, CommentResponse, PostCommentsResponse},
    },
    errors::Error,
    types::PostId,
};

#[tracing::instrument(skip_all)]
pub async fn list_comments(State(state): State<AppState>, PathParam(post_id): PathParam<PostId>) -> Result<Json<PostCommentsResponse>, Error> {
    let comments = state.comments.list_comments(post_id).await?;

    Ok(Json(PostCommentsResponse {
        post_id,
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// Comment on a post. No account needed; the commenter just gives a name.
#[tracing::instrument(skip_all)]
pub async fn create_comment(
    State(state): State<AppState>,
    PathParam(post_id): PathParam<PostId>,
    JsonBody(request): JsonBody<CommentCreate>,
) -> Result<Json<CommentResponse>, Error> {
    let comment = state.comments.create_comment(post_id, request.author, request.content).await?;
    Ok(Json(CommentResponse::from(comment)))
}
