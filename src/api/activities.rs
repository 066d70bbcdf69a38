use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_access, require_course_owner, require_enrolled_student,
    require_student_visibility, CurrentUser,
};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::ActivityCategory;
use crate::repositories;
use crate::schemas::activity::{
    ActivityCreate, ActivityListQuery, ActivityResponse, AwardPointsRequest, StudentSubmissionResponse,
    SubmissionCreate, SubmissionResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/activities", get(list_activities).post(create_activity))
        .route("/:course_id/activities/:activity_id/submissions", post(submit_activity))
        .route("/:course_id/students/:student_id/submissions", get(list_student_submissions))
        .route("/:course_id/submissions/:submission_id/points", patch(award_points))
}

async fn list_activities(
    Path(course_id): Path<String>,
    Query(query): Query<ActivityListQuery>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    require_course_access(&state, &user, &course_id).await?;

    let activities =
        repositories::activity_files::list_for_course(state.db(), &course_id, query.category)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list activities"))?;

    Ok(Json(activities.into_iter().map(ActivityResponse::from_db).collect()))
}

async fn create_activity(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<ActivityCreate>,
) -> Result<(StatusCode, Json<ActivityResponse>), ApiError> {
    let course = require_course_owner(&state, &user, &course_id).await?;
    payload.validate()?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start activity transaction"))?;

    let activity = repositories::activity_files::create(
        &mut *tx,
        repositories::activity_files::CreateActivityFile {
            id: &Uuid::new_v4().to_string(),
            course_id: &course_id,
            category: payload.category,
            points: payload.points,
            deadline: payload.deadline,
            description: payload.description.as_deref(),
            file_name: &payload.file_name,
            file_path: &payload.file_path,
            file_size: payload.file_size,
            file_type: &payload.file_type,
            uploaded_by: &user.id,
            uploaded_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create activity"))?;

    let (kind, title) = match activity.category {
        ActivityCategory::Activity => ("activity", "New activity posted"),
        ActivityCategory::Lecture => ("lecture", "New lecture material posted"),
    };
    let message = format!("{} was posted in {}", activity.file_name, course.title);
    let notified = repositories::notifications::notify_enrolled_students(
        &mut *tx,
        repositories::notifications::CourseNotice {
            course_id: &course_id,
            activity_file_id: Some(&activity.id),
            title,
            message: &message,
            kind,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to notify students"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit activity"))?;

    tracing::info!(
        course_id = %course_id,
        activity_id = %activity.id,
        notified,
        "Activity created"
    );

    Ok((StatusCode::CREATED, Json(ActivityResponse::from_db(activity))))
}

async fn submit_activity(
    Path((course_id, activity_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<SubmissionCreate>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    require_enrolled_student(&state, &user, &course_id).await?;
    payload.validate()?;

    let activity = repositories::activity_files::find_in_course(state.db(), &course_id, &activity_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch activity"))?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    if activity.category != ActivityCategory::Activity {
        return Err(ApiError::BadRequest("Lecture materials do not accept submissions".to_string()));
    }

    let submission = repositories::activity_submissions::create(
        state.db(),
        repositories::activity_submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            activity_file_id: &activity.id,
            student_id: &user.id,
            course_id: &course_id,
            description: payload.description.as_deref(),
            file_name: &payload.file_name,
            file_path: &payload.file_path,
            file_size: payload.file_size,
            file_type: &payload.file_type,
            submitted_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record submission"))?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from_db(submission, activity.deadline))))
}

async fn list_student_submissions(
    Path((course_id, student_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<StudentSubmissionResponse>>, ApiError> {
    require_student_visibility(&state, &user, &course_id, &student_id).await?;

    let submissions =
        repositories::activity_submissions::list_for_student(state.db(), &course_id, &student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(StudentSubmissionResponse::from_db).collect()))
}

async fn award_points(
    Path((course_id, submission_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<AwardPointsRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;
    payload.validate()?;

    let submission = repositories::activity_submissions::set_awarded_points(
        state.db(),
        &course_id,
        &submission_id,
        payload.awarded_points,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update awarded points"))?
    .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    let activity = repositories::activity_files::find_in_course(
        state.db(),
        &course_id,
        &submission.activity_file_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch activity"))?;

    Ok(Json(SubmissionResponse::from_db(submission, activity.and_then(|a| a.deadline))))
}
