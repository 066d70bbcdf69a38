use sqlx::PgPool;

use crate::db::models::ActivityFile;
use crate::db::types::ActivityCategory;

const COLUMNS: &str = "\
    id, course_id, category, points, deadline, description, file_name, file_path, \
    file_size, file_type, uploaded_by, uploaded_at";

pub(crate) struct CreateActivityFile<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) category: ActivityCategory,
    pub(crate) points: Option<i32>,
    pub(crate) deadline: Option<time::PrimitiveDateTime>,
    pub(crate) description: Option<&'a str>,
    pub(crate) file_name: &'a str,
    pub(crate) file_path: &'a str,
    pub(crate) file_size: i64,
    pub(crate) file_type: &'a str,
    pub(crate) uploaded_by: &'a str,
    pub(crate) uploaded_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateActivityFile<'_>,
) -> Result<ActivityFile, sqlx::Error> {
    sqlx::query_as::<_, ActivityFile>(&format!(
        "INSERT INTO activity_files (
            id, course_id, category, points, deadline, description, file_name, file_path,
            file_size, file_type, uploaded_by, uploaded_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.category)
    .bind(params.points)
    .bind(params.deadline)
    .bind(params.description)
    .bind(params.file_name)
    .bind(params.file_path)
    .bind(params.file_size)
    .bind(params.file_type)
    .bind(params.uploaded_by)
    .bind(params.uploaded_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_in_course(
    pool: &PgPool,
    course_id: &str,
    activity_id: &str,
) -> Result<Option<ActivityFile>, sqlx::Error> {
    sqlx::query_as::<_, ActivityFile>(&format!(
        "SELECT {COLUMNS} FROM activity_files WHERE id = $1 AND course_id = $2"
    ))
    .bind(activity_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
    category: Option<ActivityCategory>,
) -> Result<Vec<ActivityFile>, sqlx::Error> {
    sqlx::query_as::<_, ActivityFile>(&format!(
        "SELECT {COLUMNS} FROM activity_files
         WHERE course_id = $1 AND ($2::activitycategory IS NULL OR category = $2)
         ORDER BY uploaded_at DESC"
    ))
    .bind(course_id)
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Max points of every graded (`activity`) definition in the course.
pub(crate) async fn list_graded_points(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Option<i32>>, sqlx::Error> {
    sqlx::query_scalar("SELECT points FROM activity_files WHERE course_id = $1 AND category = $2")
        .bind(course_id)
        .bind(ActivityCategory::Activity)
        .fetch_all(pool)
        .await
}
