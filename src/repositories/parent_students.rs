use sqlx::PgPool;

use crate::db::models::ParentStudent;

const COLUMNS: &str = "id, parent_id, student_id, linked_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct LinkedStudent {
    pub(crate) link_id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) linked_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    parent_id: &str,
    student_id: &str,
    linked_at: time::PrimitiveDateTime,
) -> Result<ParentStudent, sqlx::Error> {
    sqlx::query_as::<_, ParentStudent>(&format!(
        "INSERT INTO parent_students (id, parent_id, student_id, linked_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(parent_id)
    .bind(student_id)
    .bind(linked_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_linked_students(
    pool: &PgPool,
    parent_id: &str,
) -> Result<Vec<LinkedStudent>, sqlx::Error> {
    sqlx::query_as::<_, LinkedStudent>(
        "SELECT ps.id AS link_id, ps.student_id, p.full_name, p.email, ps.linked_at
         FROM parent_students ps
         JOIN profiles p ON p.id = ps.student_id
         WHERE ps.parent_id = $1
         ORDER BY ps.linked_at",
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_parent(pool: &PgPool, parent_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM parent_students WHERE parent_id = $1")
        .bind(parent_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn is_linked(
    pool: &PgPool,
    parent_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM parent_students WHERE parent_id = $1 AND student_id = $2)",
    )
    .bind(parent_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

/// True when the parent is linked to at least one student enrolled in the course.
pub(crate) async fn is_parent_linked_to_course(
    pool: &PgPool,
    course_id: &str,
    parent_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM parent_students ps
            JOIN enrollments e ON e.student_id = ps.student_id
            WHERE e.course_id = $1 AND ps.parent_id = $2
         )",
    )
    .bind(course_id)
    .bind(parent_id)
    .fetch_one(pool)
    .await
}

/// Enrolled students of the course that the parent is linked to.
pub(crate) async fn list_linked_student_ids_in_course(
    pool: &PgPool,
    course_id: &str,
    parent_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT ps.student_id FROM parent_students ps
         JOIN enrollments e ON e.student_id = ps.student_id
         WHERE e.course_id = $1 AND ps.parent_id = $2
         ORDER BY ps.linked_at",
    )
    .bind(course_id)
    .bind(parent_id)
    .fetch_all(pool)
    .await
}
