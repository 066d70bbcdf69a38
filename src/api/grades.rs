use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, require_student_visibility, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::grade::ProjectedGradeResponse;
use crate::services::grading;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/students/:student_id/projected-grade", get(student_projected_grade))
        .route("/:course_id/projected-grades", get(course_projected_grades))
}

async fn student_projected_grade(
    Path((course_id, student_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<ProjectedGradeResponse>, ApiError> {
    require_student_visibility(&state, &user, &course_id, &student_id).await?;

    let grade = grading::projected_grade_for_student(state.db(), &course_id, &student_id).await;

    Ok(Json(ProjectedGradeResponse::new(student_id, grade)))
}

async fn course_projected_grades(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: State<AppState>,
) -> Result<Json<Vec<ProjectedGradeResponse>>, ApiError> {
    require_course_owner(&state, &user, &course_id).await?;

    let student_ids = repositories::enrollments::list_student_ids(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled students"))?;

    let mut grades =
        grading::projected_grades_for_students(state.db(), &course_id, &student_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute projected grades"))?;

    let response = student_ids
        .into_iter()
        .map(|student_id| {
            let grade = grades.remove(&student_id).unwrap_or_default();
            ProjectedGradeResponse::new(student_id, grade)
        })
        .collect();

    Ok(Json(response))
}

#[cfg(test)]
mod tests;
