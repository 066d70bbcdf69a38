use sqlx::PgPool;

use crate::db::models::Enrollment;

const COLUMNS: &str = "id, course_id, student_id, enrolled_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct EnrolledStudent {
    pub(crate) enrollment_id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) enrolled_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    student_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, course_id, student_id, enrolled_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(course_id)
    .bind(student_id)
    .bind(enrolled_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn is_student_enrolled_in_course(
    pool: &PgPool,
    course_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND student_id = $2)",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_students(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledStudent>(
        "SELECT e.id AS enrollment_id, e.student_id, p.full_name, p.email, e.enrolled_at
         FROM enrollments e
         JOIN profiles p ON p.id = e.student_id
         WHERE e.course_id = $1
         ORDER BY p.full_name NULLS LAST, e.enrolled_at",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_student_ids(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT student_id FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at")
        .bind(course_id)
        .fetch_all(pool)
        .await
}

pub(crate) async fn delete(
    pool: &PgPool,
    course_id: &str,
    enrollment_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = $1 AND course_id = $2")
        .bind(enrollment_id)
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
