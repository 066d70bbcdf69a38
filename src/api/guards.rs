use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Course, Profile};
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) const NOT_AUTHORIZED: &str = "You are not authorized to perform this action";

pub(crate) struct CurrentUser(pub(crate) Profile);

/// How the caller relates to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CourseAccess {
    Owner,
    Student,
    Parent,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let profile = repositories::profiles::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
            .ok_or(ApiError::Unauthorized("Profile not found"))?;

        Ok(CurrentUser(profile))
    }
}

pub(crate) fn require_role(profile: &Profile, role: UserRole) -> Result<(), ApiError> {
    if profile.role == Some(role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(NOT_AUTHORIZED))
    }
}

pub(crate) async fn load_course(state: &AppState, course_id: &str) -> Result<Course, ApiError> {
    repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}

pub(crate) async fn require_course_owner(
    state: &AppState,
    profile: &Profile,
    course_id: &str,
) -> Result<Course, ApiError> {
    let course = load_course(state, course_id).await?;
    if course.instructor_id == profile.id {
        Ok(course)
    } else {
        Err(ApiError::Forbidden(NOT_AUTHORIZED))
    }
}

pub(crate) async fn require_enrolled_student(
    state: &AppState,
    profile: &Profile,
    course_id: &str,
) -> Result<Course, ApiError> {
    let course = load_course(state, course_id).await?;
    require_role(profile, UserRole::Student)?;

    let enrolled =
        repositories::enrollments::is_student_enrolled_in_course(state.db(), course_id, &profile.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to verify enrollment"))?;

    if enrolled {
        Ok(course)
    } else {
        Err(ApiError::Forbidden("You are not enrolled in this course"))
    }
}

/// Owner, enrolled student, or parent of an enrolled student.
pub(crate) async fn require_course_access(
    state: &AppState,
    profile: &Profile,
    course_id: &str,
) -> Result<(Course, CourseAccess), ApiError> {
    let course = load_course(state, course_id).await?;
    if course.instructor_id == profile.id {
        return Ok((course, CourseAccess::Owner));
    }

    let allowed = match profile.role {
        Some(UserRole::Student) => {
            repositories::enrollments::is_student_enrolled_in_course(
                state.db(),
                course_id,
                &profile.id,
            )
            .await
        }
        Some(UserRole::Parent) => {
            repositories::parent_students::is_parent_linked_to_course(
                state.db(),
                course_id,
                &profile.id,
            )
            .await
        }
        _ => Ok(false),
    }
    .map_err(|e| ApiError::internal(e, "Failed to verify course access"))?;

    match (allowed, profile.role) {
        (true, Some(UserRole::Student)) => Ok((course, CourseAccess::Student)),
        (true, Some(UserRole::Parent)) => Ok((course, CourseAccess::Parent)),
        _ => Err(ApiError::Forbidden(NOT_AUTHORIZED)),
    }
}

/// Per-student course data is visible to the owner, the student, and linked parents.
pub(crate) async fn require_student_visibility(
    state: &AppState,
    profile: &Profile,
    course_id: &str,
    student_id: &str,
) -> Result<(Course, CourseAccess), ApiError> {
    let (course, access) = require_course_access(state, profile, course_id).await?;

    let visible = match access {
        CourseAccess::Owner => true,
        CourseAccess::Student => profile.id == student_id,
        CourseAccess::Parent => {
            repositories::parent_students::is_linked(state.db(), &profile.id, student_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to verify parent link"))?
        }
    };

    if visible {
        Ok((course, access))
    } else {
        Err(ApiError::Forbidden(NOT_AUTHORIZED))
    }
}
