use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Attendance;
use crate::db::types::AttendanceStatus;

const COLUMNS: &str = "\
    id, course_id, student_id, session_id, status, marked_at, time_in, time_out, created_at";

pub(crate) struct CreateAttendance<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) session_id: Option<&'a str>,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_at: time::PrimitiveDateTime,
    pub(crate) time_in: Option<time::PrimitiveDateTime>,
    pub(crate) time_out: Option<time::PrimitiveDateTime>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AttendanceHistoryRow {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_at: time::PrimitiveDateTime,
    pub(crate) time_in: Option<time::PrimitiveDateTime>,
    pub(crate) time_out: Option<time::PrimitiveDateTime>,
}

pub(crate) struct HistoryFilter<'a> {
    pub(crate) course_id: &'a str,
    /// Empty means every student of the course.
    pub(crate) student_ids: &'a [String],
    pub(crate) complete_only: bool,
    pub(crate) limit: i64,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAttendance<'_>,
) -> Result<Attendance, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "INSERT INTO attendance (
            id, course_id, student_id, session_id, status, marked_at, time_in, time_out, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.student_id)
    .bind(params.session_id)
    .bind(params.status)
    .bind(params.marked_at)
    .bind(params.time_in)
    .bind(params.time_out)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_for_session(
    pool: &PgPool,
    session_id: &str,
    student_id: &str,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance WHERE session_id = $1 AND student_id = $2"
    ))
    .bind(session_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_open_for_course(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance
         WHERE course_id = $1 AND student_id = $2 AND time_out IS NULL
         ORDER BY time_in DESC NULLS LAST
         LIMIT 1"
    ))
    .bind(course_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_time_out(
    pool: &PgPool,
    attendance_id: &str,
    time_out: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE attendance SET time_out = $1 WHERE id = $2")
        .bind(time_out)
        .bind(attendance_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn list_statuses(
    pool: &PgPool,
    course_id: &str,
    student_ids: &[String],
) -> Result<Vec<(String, AttendanceStatus)>, sqlx::Error> {
    sqlx::query_as::<_, (String, AttendanceStatus)>(
        "SELECT student_id, status FROM attendance WHERE course_id = $1 AND student_id = ANY($2)",
    )
    .bind(course_id)
    .bind(student_ids)
    .fetch_all(pool)
    .await
}

/// Newest first by `time_in`, falling back to `marked_at`.
pub(crate) async fn list_history(
    pool: &PgPool,
    filter: HistoryFilter<'_>,
) -> Result<Vec<AttendanceHistoryRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT a.id, a.course_id, a.student_id, p.full_name AS student_name, a.session_id, \
         a.status, a.marked_at, a.time_in, a.time_out \
         FROM attendance a LEFT JOIN profiles p ON p.id = a.student_id \
         WHERE a.course_id = ",
    );
    builder.push_bind(filter.course_id);

    if !filter.student_ids.is_empty() {
        builder.push(" AND a.student_id = ANY(");
        builder.push_bind(filter.student_ids);
        builder.push(")");
    }

    if filter.complete_only {
        builder.push(" AND a.time_in IS NOT NULL AND a.time_out IS NOT NULL");
    }

    builder.push(" ORDER BY COALESCE(a.time_in, a.marked_at) DESC LIMIT ");
    builder.push_bind(filter.limit.clamp(1, 1000));

    builder.build_query_as::<AttendanceHistoryRow>().fetch_all(pool).await
}
