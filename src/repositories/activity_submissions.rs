use sqlx::PgPool;

use crate::db::models::ActivitySubmission;

const COLUMNS: &str = "\
    id, activity_file_id, student_id, course_id, awarded_points, description, file_name, \
    file_path, file_size, file_type, submitted_at";

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) activity_file_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) file_name: &'a str,
    pub(crate) file_path: &'a str,
    pub(crate) file_size: i64,
    pub(crate) file_type: &'a str,
    pub(crate) submitted_at: time::PrimitiveDateTime,
}

/// A submission joined with the definition it answers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubmissionWithActivity {
    pub(crate) id: String,
    pub(crate) activity_file_id: String,
    pub(crate) activity_file_name: String,
    pub(crate) awarded_points: Option<i32>,
    pub(crate) max_points: Option<i32>,
    pub(crate) deadline: Option<time::PrimitiveDateTime>,
    pub(crate) description: Option<String>,
    pub(crate) file_name: String,
    pub(crate) file_path: String,
    pub(crate) file_size: i64,
    pub(crate) file_type: String,
    pub(crate) submitted_at: time::PrimitiveDateTime,
}

impl SubmissionWithActivity {
    /// Never late without a deadline.
    pub(crate) fn is_late(&self) -> bool {
        self.deadline.is_some_and(|deadline| self.submitted_at > deadline)
    }
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<ActivitySubmission, sqlx::Error> {
    sqlx::query_as::<_, ActivitySubmission>(&format!(
        "INSERT INTO activity_submissions (
            id, activity_file_id, student_id, course_id, description, file_name, file_path,
            file_size, file_type, submitted_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.activity_file_id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.description)
    .bind(params.file_name)
    .bind(params.file_path)
    .bind(params.file_size)
    .bind(params.file_type)
    .bind(params.submitted_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<Vec<SubmissionWithActivity>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionWithActivity>(
        "SELECT s.id, s.activity_file_id, a.file_name AS activity_file_name,
                s.awarded_points, a.points AS max_points, a.deadline, s.description,
                s.file_name, s.file_path, s.file_size, s.file_type, s.submitted_at
         FROM activity_submissions s
         JOIN activity_files a ON a.id = s.activity_file_id
         WHERE s.course_id = $1 AND s.student_id = $2
         ORDER BY s.submitted_at DESC",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// Sets or clears the awarded points. Returns the updated row when it belongs to the course.
pub(crate) async fn set_awarded_points(
    pool: &PgPool,
    course_id: &str,
    submission_id: &str,
    awarded_points: Option<i32>,
) -> Result<Option<ActivitySubmission>, sqlx::Error> {
    sqlx::query_as::<_, ActivitySubmission>(&format!(
        "UPDATE activity_submissions SET awarded_points = $1
         WHERE id = $2 AND course_id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(awarded_points)
    .bind(submission_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_awarded_points(
    pool: &PgPool,
    course_id: &str,
    student_ids: &[String],
) -> Result<Vec<(String, Option<i32>)>, sqlx::Error> {
    sqlx::query_as::<_, (String, Option<i32>)>(
        "SELECT student_id, awarded_points FROM activity_submissions
         WHERE course_id = $1 AND student_id = ANY($2)",
    )
    .bind(course_id)
    .bind(student_ids)
    .fetch_all(pool)
    .await
}
