use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_unique_violation;
use crate::db::models::Session;
use crate::repositories;
use crate::schemas::attendance::{
    EndSessionResponse, ParticipantResponse, SessionQrQuery, SessionQrResponse, SessionResponse,
};
use crate::services::qr_payload;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/sessions", get(list_sessions).post(start_session))
        .route("/:course_id/sessions/:session_id/end", post(end_session))
        .route("/:course_id/sessions/:session_id/qr", get(session_qr))
        .route("/:course_id/sessions/:session_id/participants", get(list_participants))
}

async fn load_session(
    state: &AppState,
    course_id: &str,
    session_id: &str,
) -> Result<Session, ApiError> {
    repositories::sessions::find_in_course(state.db(), course_id, session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch session"))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

async fn list_sessions(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let sessions = repositories::sessions::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;

    Ok(Json(sessions.into_iter().map(SessionResponse::from_db).collect()))
}

async fn start_session(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let session = repositories::sessions::start(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("A session is already active for this course".to_string())
        } else {
            ApiError::internal(e, "Failed to start session")
        }
    })?;

    tracing::info!(course_id = %course_id, session_id = %session.id, "Session started");

    Ok((StatusCode::CREATED, Json(SessionResponse::from_db(session))))
}

async fn end_session(
    Path((course_id, session_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<EndSessionResponse>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;
    load_session(&state, &course_id, &session_id).await?;

    let session = repositories::sessions::end(state.db(), &session_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to end session"))?
        .ok_or_else(|| ApiError::Conflict("Session has already ended".to_string()))?;

    let present_count = repositories::session_participants::count_present(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count participants"))?;

    tracing::info!(
        course_id = %course_id,
        session_id = %session_id,
        present_count,
        "Session ended"
    );

    Ok(Json(EndSessionResponse { session: SessionResponse::from_db(session), present_count }))
}

async fn session_qr(
    Path((course_id, session_id)): Path<(String, String)>,
    Query(query): Query<SessionQrQuery>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<SessionQrResponse>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;
    let session = load_session(&state, &course_id, &session_id).await?;

    let qr_text = qr_payload::encode_session_qr(query.kind, &session.id, &session.course_id)
        .map_err(|e| ApiError::internal(e, "Failed to build session QR"))?;

    Ok(Json(SessionQrResponse { session_id: session.id, course_id: session.course_id, qr_text }))
}

async fn list_participants(
    Path((course_id, session_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<ParticipantResponse>>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;
    load_session(&state, &course_id, &session_id).await?;

    let participants = repositories::session_participants::list_for_session(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list participants"))?;

    Ok(Json(participants.into_iter().map(ParticipantResponse::from_db).collect()))
}
