use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{
        extract::{JsonBody, PathParam, QueryParams},
        models::posts::{ListPostsQuery, PostListResponse, PostResponse, PostWrite},
    },
    auth::current_user::AuthenticatedUser,
    errors::Error,
    types::PostId,
};

/// List posts, optionally by one author, one page at a time
#[tracing::instrument(skip_all)]
pub async fn list_posts(State(state): State<AppState>, QueryParams(query): QueryParams<ListPostsQuery>) -> Result<Json<PostListResponse>, Error> {
    let (posts, total) = state.posts.list_posts(query.author_id, query.page()).await?;

    Ok(Json(PostListResponse {
        total,
        data: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn get_post(State(state): State<AppState>, PathParam(id): PathParam<PostId>) -> Result<Json<PostResponse>, Error> {
    let post = state.posts.get_post(id).await?;
    Ok(Json(PostResponse::from(post)))
}

/// Publish a post as the authenticated user
#[tracing::instrument(skip_all)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    JsonBody(request): JsonBody<PostWrite>,
) -> Result<Json<PostResponse>, Error> {
    // A token for a user that no longer exists is a bad request, not a missing resource
    let post = state
        .posts
        .create_post(user_id, request.title, request.content)
        .await
        .map_err(|err| match err {
            e @ Error::NotFound { .. } => Error::bad_request(e.user_message()),
            other => other,
        })?;

    Ok(Json(PostResponse::from(post)))
}

#[tracing::instrument(skip_all)]
pub async fn update_post(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    PathParam(id): PathParam<PostId>,
    JsonBody(request): JsonBody<PostWrite>,
) -> Result<Json<PostResponse>, Error> {
    let post = state.posts.update_post(id, user_id, request.title, request.content).await?;
    Ok(Json(PostResponse::from(post)))
}

#[tracing::instrument(skip_all)]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    PathParam(id): PathParam<PostId>,
) -> Result<(), Error> {
    state.posts.delete_post(id, user_id).await
}
