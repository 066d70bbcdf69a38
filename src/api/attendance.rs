use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_access, require_enrolled_student, CourseAccess, CurrentUser, NOT_AUTHORIZED,
};
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::attendance::{
    AttendanceQuery, AttendanceRecordResponse, ScanRequest, ScanResponse, DEFAULT_HISTORY_LIMIT,
};
use crate::services::attendance::{self as scan, ScanContext, ScanCourse, ScanError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/attendance", get(attendance_history))
        .route("/:course_id/attendance/scan", post(scan_qr))
}

async fn scan_qr(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let course = require_enrolled_student(&state, &user, &course_id).await?;
    payload.validate()?;

    let ctx = ScanContext {
        student_id: user.id.clone(),
        course: Some(ScanCourse { id: course.id, course_code: course.course_code }),
        mode: state.settings().attendance().scan_mode,
        now: primitive_now_utc(),
    };

    let outcome = scan::process_scan(state.db(), &ctx, &payload.qr_text).await.map_err(|e| {
        metrics::record_scan("error");
        scan_error(e, &user.id, &course_id)
    })?;

    metrics::record_scan(outcome.label());
    tracing::info!(
        student_id = %user.id,
        course_id = %course_id,
        outcome = outcome.label(),
        "Attendance scan processed"
    );

    Ok(Json(ScanResponse::from_outcome(&outcome)))
}

fn scan_error(error: ScanError, student_id: &str, course_id: &str) -> ApiError {
    let step = error.step();
    match error {
        ScanError::MissingCourse => ApiError::BadRequest(error.to_string()),
        ScanError::SessionLookup(ref source)
        | ScanError::Participation(ref source)
        | ScanError::AttendanceLookup(ref source)
        | ScanError::RecordTimeIn(ref source)
        | ScanError::RecordTimeOut(ref source)
        | ScanError::LegacyTimeIn(ref source)
        | ScanError::LegacyTimeOut(ref source) => {
            tracing::error!(
                error = %source,
                step,
                student_id = %student_id,
                course_id = %course_id,
                "Attendance scan step failed"
            );
            ApiError::Internal(error.to_string())
        }
    }
}

async fn attendance_history(
    Path(course_id): Path<String>,
    Query(query): Query<AttendanceQuery>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<AttendanceRecordResponse>>, ApiError> {
    let (_, access) = require_course_access(&state, &user, &course_id).await?;

    let student_ids = match access {
        CourseAccess::Owner => query.student_id.into_iter().collect::<Vec<_>>(),
        CourseAccess::Student => {
            if query.student_id.as_deref().is_some_and(|id| id != user.id) {
                return Err(ApiError::Forbidden(NOT_AUTHORIZED));
            }
            vec![user.id.clone()]
        }
        CourseAccess::Parent => {
            let linked = repositories::parent_students::list_linked_student_ids_in_course(
                state.db(),
                &course_id,
                &user.id,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load linked students"))?;
            match query.student_id {
                Some(requested) if linked.contains(&requested) => vec![requested],
                Some(_) => return Err(ApiError::Forbidden(NOT_AUTHORIZED)),
                None => linked,
            }
        }
    };

    let rows = repositories::attendance::list_history(
        state.db(),
        repositories::attendance::HistoryFilter {
            course_id: &course_id,
            student_ids: &student_ids,
            complete_only: query.complete_only,
            limit: query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load attendance history"))?;

    Ok(Json(rows.into_iter().map(AttendanceRecordResponse::from_db).collect()))
}
