use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::notification::{
    MarkAllReadResponse, NotificationListResponse, NotificationResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_read))
        .route("/:notification_id/read", post(mark_read))
}

async fn list_notifications(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let (items, unread_count) = tokio::try_join!(
        repositories::notifications::list_for_user(state.db(), &user.id),
        repositories::notifications::count_unread(state.db(), &user.id),
    )
    .map_err(|e| ApiError::internal(e, "Failed to load notifications"))?;

    Ok(Json(NotificationListResponse {
        items: items.into_iter().map(NotificationResponse::from_db).collect(),
        unread_count,
    }))
}

async fn mark_read(
    Path(notification_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    let updated = repositories::notifications::mark_read(state.db(), &user.id, &notification_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update notification"))?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Notification not found".to_string()))
    }
}

async fn mark_all_read(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = repositories::notifications::mark_all_read(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update notifications"))?;

    Ok(Json(MarkAllReadResponse { updated }))
}

#[cfg(test)]
mod tests;
