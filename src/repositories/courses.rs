use sqlx::PgPool;

use crate::db::models::Course;
use crate::services::course_codes;

const COURSE_COLUMNS: &str =
    "id, title, description, course_code, instructor_id, created_at, updated_at";
const CODE_ATTEMPTS: usize = 16;

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) course_code: Option<&'a str>,
    pub(crate) instructor_id: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CourseRef {
    pub(crate) id: String,
    pub(crate) title: String,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, course_code, instructor_id, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.course_code)
    .bind(params.instructor_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_instructor(
    pool: &PgPool,
    instructor_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE instructor_id = $1 ORDER BY created_at DESC"
    ))
    .bind(instructor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.title, c.description, c.course_code, c.instructor_id,
                c.created_at, c.updated_at
         FROM courses c
         JOIN enrollments e ON e.course_id = c.id
         WHERE e.student_id = $1
         ORDER BY e.enrolled_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_parent(
    pool: &PgPool,
    parent_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT DISTINCT c.id, c.title, c.description, c.course_code, c.instructor_id,
                c.created_at, c.updated_at
         FROM courses c
         JOIN enrollments e ON e.course_id = c.id
         JOIN parent_students ps ON ps.student_id = e.student_id
         WHERE ps.parent_id = $1
         ORDER BY c.created_at DESC",
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await
}

/// Lookup after trimming and upper-casing the code.
pub(crate) async fn get_course_by_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<CourseRef>, sqlx::Error> {
    sqlx::query_as::<_, CourseRef>("SELECT id, title FROM courses WHERE upper(course_code) = $1")
        .bind(course_codes::normalize_course_code(code))
        .fetch_optional(pool)
        .await
}

pub(crate) async fn code_exists(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE course_code = $1)")
        .bind(code)
        .fetch_one(pool)
        .await
}

/// Draws random codes until one is not taken. `None` when every attempt collided.
pub(crate) async fn generate_course_code(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
    for _ in 0..CODE_ATTEMPTS {
        let code = course_codes::generate_course_code();
        if !code_exists(pool, &code).await? {
            return Ok(Some(code));
        }
    }
    Ok(None)
}

pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
