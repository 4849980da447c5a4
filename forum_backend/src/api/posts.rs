use super::threads::DeleteResponse;
use super::{ApiError, ApiResult, AppState, PageParams};
use crate::forum::{CreatePostInput, PostView, UpdatePostInput};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

pub(crate) async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    let post = state.forum.create_post(input)?;
    state.notifier.notify(&format!("Post added: {}", post.name));
    Ok((StatusCode::CREATED, Json(post)))
}

pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Vec<PostView>> {
    let posts = state.forum.list_posts(params.skip, params.limit)?;
    Ok(Json(posts))
}

pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PostView> {
    match state.forum.get_post(id)? {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::NotFound(format!("post {id} not found"))),
    }
}

pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdatePostInput>,
) -> ApiResult<PostView> {
    match state.forum.update_post(id, patch)? {
        Some(post) => {
            state
                .notifier
                .notify(&format!("Post updated: {}", post.name));
            Ok(Json(post))
        }
        None => Err(ApiError::NotFound(format!("post {id} not found"))),
    }
}

pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DeleteResponse> {
    if state.forum.delete_post(id)? {
        state.notifier.notify(&format!("Post deleted: ID {id}"));
        Ok(Json(DeleteResponse { deleted: true }))
    } else {
        Err(ApiError::NotFound(format!("post {id} not found")))
    }
}
