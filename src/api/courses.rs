use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_course_owner, require_role, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::{is_foreign_key_violation, is_unique_violation};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::course::{
    CourseCreate, CourseResponse, EnrollRequest, EnrollResponse, EnrolledStudentResponse,
    EnrollmentQrResponse,
};
use crate::services::qr_payload;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/enroll", post(enroll))
        .route("/:course_id", get(get_course).delete(delete_course))
        .route("/:course_id/enrollment-qr", get(enrollment_qr))
        .route("/:course_id/students", get(list_students))
        .route("/:course_id/enrollments/:enrollment_id", delete(remove_enrollment))
}

async fn list_courses(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = match user.role {
        Some(UserRole::Instructor) => {
            repositories::courses::list_by_instructor(state.db(), &user.id).await
        }
        Some(UserRole::Student) => repositories::courses::list_for_student(state.db(), &user.id).await,
        Some(UserRole::Parent) => repositories::courses::list_for_parent(state.db(), &user.id).await,
        None => Ok(Vec::new()),
    }
    .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn create_course(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    require_role(&user, UserRole::Instructor)?;
    payload.validate()?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Course title must not be empty".to_string()));
    }

    let course_code = repositories::courses::generate_course_code(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to generate course code"))?
        .ok_or_else(|| ApiError::Internal("Failed to generate course code".to_string()))?;

    let now = primitive_now_utc();
    let description = payload.description.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title,
            description,
            course_code: Some(&course_code),
            instructor_id: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Course code collision, please retry".to_string())
        } else {
            ApiError::internal(e, "Failed to create course")
        }
    })?;

    tracing::info!(
        instructor_id = %user.id,
        course_id = %course.id,
        action = "course_create",
        "Instructor created course"
    );

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<CourseResponse>, ApiError> {
    let (course, _) = require_course_access(&state, &user, &course_id).await?;
    Ok(Json(CourseResponse::from_db(course)))
}

async fn delete_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let deleted = repositories::courses::delete(state.db(), &course_id).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            ApiError::Conflict("Cannot delete course due dependent records".to_string())
        } else {
            ApiError::internal(e, "Failed to delete course")
        }
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(
        instructor_id = %user.id,
        course_id = %course_id,
        action = "course_delete",
        "Instructor deleted course"
    );

    Ok(StatusCode::NO_CONTENT)
}

async fn enrollment_qr(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<EnrollmentQrResponse>, ApiError> {
    let course = require_course_owner(&state, &user, &course_id).await?;
    let course_code = course
        .course_code
        .ok_or_else(|| ApiError::NotFound("Course has no course code".to_string()))?;

    let student_qr = qr_payload::encode_enrollment_qr(UserRole::Student, &course_code)
        .map_err(|e| ApiError::internal(e, "Failed to build enrollment QR"))?;
    let parent_qr = qr_payload::encode_enrollment_qr(UserRole::Parent, &course_code)
        .map_err(|e| ApiError::internal(e, "Failed to build enrollment QR"))?;

    Ok(Json(EnrollmentQrResponse { course_id: course.id, course_code, student_qr, parent_qr }))
}

async fn enroll(
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollResponse>), ApiError> {
    require_role(&user, UserRole::Student)?;
    payload.validate()?;

    let code = qr_payload::enrollment_code_from_text(&payload.code);
    let course = repositories::courses::get_course_by_code(state.db(), &code)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up course code"))?
        .ok_or_else(|| {
            ApiError::NotFound("Invalid course code. Please check and try again.".to_string())
        })?;

    let enrollment = repositories::enrollments::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course.id,
        &user.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("You are already enrolled in this course.".to_string())
        } else {
            ApiError::internal(e, "Failed to enroll in course. Please try again.")
        }
    })?;

    tracing::info!(
        student_id = %user.id,
        course_id = %course.id,
        action = "course_enroll",
        "Student enrolled in course"
    );

    Ok((StatusCode::CREATED, Json(EnrollResponse::from_db(enrollment, course.title))))
}

async fn list_students(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<EnrolledStudentResponse>>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let students = repositories::enrollments::list_students(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled students"))?;

    Ok(Json(students.into_iter().map(EnrolledStudentResponse::from_db).collect()))
}

async fn remove_enrollment(
    Path((course_id, enrollment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let deleted = repositories::enrollments::delete(state.db(), &course_id, &enrollment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove enrollment"))?;

    if !deleted {
        return Err(ApiError::NotFound("Enrollment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
