use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_role, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::is_unique_violation;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::parent::{LinkStudentRequest, LinkedStudentResponse};

pub(crate) const MAX_LINKED_STUDENTS: i64 = 4;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/students", get(list_students).post(link_student))
}

async fn list_students(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<LinkedStudentResponse>>, ApiError> {
    require_role(&user, UserRole::Parent)?;

    let students = repositories::parent_students::list_linked_students(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list linked students"))?;

    Ok(Json(students.into_iter().map(LinkedStudentResponse::from_db).collect()))
}

async fn link_student(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<LinkStudentRequest>,
) -> Result<(StatusCode, Json<LinkedStudentResponse>), ApiError> {
    require_role(&user, UserRole::Parent)?;
    payload.validate()?;

    let linked = repositories::parent_students::count_for_parent(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count linked students"))?;
    if linked >= MAX_LINKED_STUDENTS {
        return Err(ApiError::BadRequest(format!(
            "You can link at most {MAX_LINKED_STUDENTS} students"
        )));
    }

    let student = repositories::profiles::get_student_by_name(state.db(), &payload.student_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up student"))?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("No student found with that name".to_string()))?;

    let link = repositories::parent_students::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &user.id,
        &student.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("This student is already linked to your account".to_string())
        } else {
            ApiError::internal(e, "Failed to link student")
        }
    })?;

    tracing::info!(parent_id = %user.id, student_id = %student.id, "Parent linked to student");

    Ok((
        StatusCode::CREATED,
        Json(LinkedStudentResponse {
            link_id: link.id,
            student_id: link.student_id,
            full_name: student.full_name,
            email: None,
            linked_at: format_primitive(link.linked_at),
        }),
    ))
}
