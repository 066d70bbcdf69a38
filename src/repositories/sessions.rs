use sqlx::PgPool;

use crate::db::models::Session;
use crate::db::types::SessionStatus;

const COLUMNS: &str = "id, course_id, started_at, ended_at, status, created_at";

/// Fails with a unique violation while another session of the course is active.
pub(crate) async fn start(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    started_at: time::PrimitiveDateTime,
) -> Result<Session, sqlx::Error> {
    sqlx::query_as::<_, Session>(&format!(
        "INSERT INTO sessions (id, course_id, started_at, status, created_at)
         VALUES ($1,$2,$3,$4,$3)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(course_id)
    .bind(started_at)
    .bind(SessionStatus::Active)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_course_id(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT course_id FROM sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_in_course(
    pool: &PgPool,
    course_id: &str,
    session_id: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(&format!(
        "SELECT {COLUMNS} FROM sessions WHERE id = $1 AND course_id = $2"
    ))
    .bind(session_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(&format!(
        "SELECT {COLUMNS} FROM sessions WHERE course_id = $1 ORDER BY started_at DESC"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

/// Ends an active session. `None` when it was not active.
pub(crate) async fn end(
    pool: &PgPool,
    session_id: &str,
    ended_at: time::PrimitiveDateTime,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(&format!(
        "UPDATE sessions SET status = $1, ended_at = $2
         WHERE id = $3 AND status = $4
         RETURNING {COLUMNS}"
    ))
    .bind(SessionStatus::Ended)
    .bind(ended_at)
    .bind(session_id)
    .bind(SessionStatus::Active)
    .fetch_optional(pool)
    .await
}
