use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_course_owner, CourseAccess, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::exam_scores::UpsertExamScore;
use crate::schemas::exam_score::{ExamScoreResponse, ExamScoresUpsert};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:course_id/exam-scores", get(list_exam_scores).put(upsert_exam_scores))
}

async fn list_exam_scores(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<ExamScoreResponse>>, ApiError> {
    let (_, access) = require_course_access(&state, &user, &course_id).await?;

    let visible = match access {
        CourseAccess::Owner => None,
        CourseAccess::Student => Some(vec![user.id.clone()]),
        CourseAccess::Parent => Some(
            repositories::parent_students::list_linked_student_ids_in_course(
                state.db(),
                &course_id,
                &user.id,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load linked students"))?,
        ),
    };

    let rows = repositories::exam_scores::list_for_course(state.db(), &course_id, visible.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam scores"))?;

    Ok(Json(rows.into_iter().map(ExamScoreResponse::from_db).collect()))
}

async fn upsert_exam_scores(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
    Json(payload): Json<ExamScoresUpsert>,
) -> Result<Json<Vec<ExamScoreResponse>>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;
    payload.validate()?;

    let enrolled = repositories::enrollments::list_student_ids(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled students"))?;

    if let Some(entry) = payload.scores.iter().find(|entry| !enrolled.contains(&entry.student_id)) {
        return Err(ApiError::BadRequest(format!(
            "Student {} is not enrolled in this course",
            entry.student_id
        )));
    }

    let now = primitive_now_utc();
    for entry in &payload.scores {
        repositories::exam_scores::upsert(
            state.db(),
            UpsertExamScore {
                course_id: &course_id,
                student_id: &entry.student_id,
                midterm_score: entry.midterm_score,
                final_score: entry.final_score,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save exam score"))?;
    }

    tracing::info!(
        course_id = %course_id,
        instructor_id = %user.id,
        count = payload.scores.len(),
        "Exam scores saved"
    );

    let rows = repositories::exam_scores::list_for_course(state.db(), &course_id, None)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam scores"))?;

    Ok(Json(rows.into_iter().map(ExamScoreResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
