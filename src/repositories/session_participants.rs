use sqlx::PgPool;

use crate::db::models::SessionParticipant;

const COLUMNS: &str = "id, session_id, student_id, joined_at, marked_present, marked_present_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ParticipantWithName {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) joined_at: time::PrimitiveDateTime,
    pub(crate) marked_present: bool,
    pub(crate) marked_present_at: Option<time::PrimitiveDateTime>,
}

/// Keyed on (session_id, student_id). An existing row keeps its `joined_at`.
pub(crate) async fn upsert_present(
    pool: &PgPool,
    session_id: &str,
    student_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<SessionParticipant, sqlx::Error> {
    sqlx::query_as::<_, SessionParticipant>(&format!(
        "INSERT INTO session_participants (
            id, session_id, student_id, joined_at, marked_present, marked_present_at
         ) VALUES ($1,$2,$3,$4,TRUE,$4)
         ON CONFLICT (session_id, student_id)
         DO UPDATE SET marked_present = TRUE,
                       marked_present_at = EXCLUDED.marked_present_at
         RETURNING {COLUMNS}"
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(session_id)
    .bind(student_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn insert_if_absent(
    pool: &PgPool,
    session_id: &str,
    student_id: &str,
    joined_at: time::PrimitiveDateTime,
) -> Result<Option<SessionParticipant>, sqlx::Error> {
    sqlx::query_as::<_, SessionParticipant>(&format!(
        "INSERT INTO session_participants (id, session_id, student_id, joined_at, marked_present)
         VALUES ($1,$2,$3,$4,FALSE)
         ON CONFLICT (session_id, student_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(session_id)
    .bind(student_id)
    .bind(joined_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find(
    pool: &PgPool,
    session_id: &str,
    student_id: &str,
) -> Result<Option<SessionParticipant>, sqlx::Error> {
    sqlx::query_as::<_, SessionParticipant>(&format!(
        "SELECT {COLUMNS} FROM session_participants WHERE session_id = $1 AND student_id = $2"
    ))
    .bind(session_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_present(
    pool: &PgPool,
    session_id: &str,
    student_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE session_participants SET marked_present = TRUE, marked_present_at = $1
         WHERE session_id = $2 AND student_id = $3",
    )
    .bind(now)
    .bind(session_id)
    .bind(student_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_for_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<ParticipantWithName>, sqlx::Error> {
    sqlx::query_as::<_, ParticipantWithName>(
        "SELECT sp.id, sp.student_id, p.full_name, sp.joined_at, sp.marked_present,
                sp.marked_present_at
         FROM session_participants sp
         LEFT JOIN profiles p ON p.id = sp.student_id
         WHERE sp.session_id = $1
         ORDER BY sp.joined_at",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_present(pool: &PgPool, session_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM session_participants WHERE session_id = $1 AND marked_present",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await
}
