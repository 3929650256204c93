use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::comments::{CommentListResponse, FilterOption, ListCommentsQuery},
    error::AppError,
    usecases::comments::CommentAdminService,
};

pub async fn list_comments_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    let response = CommentAdminService::list_comments(&state, auth_user.user_id, query).await?;
    Ok(Json(response))
}

pub async fn list_authors_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<Vec<FilterOption<i64>>>, AppError> {
    let options = CommentAdminService::list_authors(&state, auth_user.user_id, query).await?;
    Ok(Json(options))
}

pub async fn list_contexts_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<FilterOption<String>>>, AppError> {
    let options = CommentAdminService::list_contexts(&state, auth_user.user_id).await?;
    Ok(Json(options))
}

pub async fn list_context_items_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<Vec<FilterOption<i64>>>, AppError> {
    let options =
        CommentAdminService::list_context_items(&state, auth_user.user_id, query).await?;
    Ok(Json(options))
}

pub async fn health_handle() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
