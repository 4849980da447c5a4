use super::{ApiError, ApiResult, AppState, PageParams};
use crate::forum::{CreateThreadInput, ThreadView, UpdateThreadInput};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    pub deleted: bool,
}

pub(crate) async fn create_thread(
    State(state): State<AppState>,
    Json(input): Json<CreateThreadInput>,
) -> Result<(StatusCode, Json<ThreadView>), ApiError> {
    let thread = state.forum.create_thread(input)?;
    state
        .notifier
        .notify(&format!("Thread added: {}", thread.name));
    Ok((StatusCode::CREATED, Json(thread)))
}

pub(crate) async fn list_threads(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Vec<ThreadView>> {
    let threads = state.forum.list_threads(params.skip, params.limit)?;
    Ok(Json(threads))
}

pub(crate) async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ThreadView> {
    match state.forum.get_thread(id)? {
        Some(thread) => Ok(Json(thread)),
        None => Err(ApiError::NotFound(format!("thread {id} not found"))),
    }
}

pub(crate) async fn update_thread(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateThreadInput>,
) -> ApiResult<ThreadView> {
    // notify only once the merge is confirmed committed
    match state.forum.update_thread(id, patch)? {
        Some(thread) => {
            state
                .notifier
                .notify(&format!("Thread updated: {}", thread.name));
            Ok(Json(thread))
        }
        None => Err(ApiError::NotFound(format!("thread {id} not found"))),
    }
}

pub(crate) async fn delete_thread(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DeleteResponse> {
    if state.forum.delete_thread(id)? {
        state.notifier.notify(&format!("Thread deleted: ID {id}"));
        Ok(Json(DeleteResponse { deleted: true }))
    } else {
        Err(ApiError::NotFound(format!("thread {id} not found")))
    }
}
