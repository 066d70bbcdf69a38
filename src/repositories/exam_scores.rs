use sqlx::PgPool;

use crate::db::models::ExamScore;

const COLUMNS: &str = "id, course_id, student_id, midterm_score, final_score, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ExamScoreWithName {
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) midterm_score: Option<f64>,
    pub(crate) final_score: Option<f64>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpsertExamScore<'a> {
    pub(crate) course_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) midterm_score: Option<f64>,
    pub(crate) final_score: Option<f64>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn upsert(
    pool: &PgPool,
    params: UpsertExamScore<'_>,
) -> Result<ExamScore, sqlx::Error> {
    sqlx::query_as::<_, ExamScore>(&format!(
        "INSERT INTO exam_scores (id, course_id, student_id, midterm_score, final_score, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (course_id, student_id)
         DO UPDATE SET midterm_score = EXCLUDED.midterm_score,
                       final_score = EXCLUDED.final_score,
                       updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(params.course_id)
    .bind(params.student_id)
    .bind(params.midterm_score)
    .bind(params.final_score)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
    student_ids: Option<&[String]>,
) -> Result<Vec<ExamScoreWithName>, sqlx::Error> {
    sqlx::query_as::<_, ExamScoreWithName>(
        "SELECT s.student_id, p.full_name, s.midterm_score, s.final_score, s.updated_at
         FROM exam_scores s
         LEFT JOIN profiles p ON p.id = s.student_id
         WHERE s.course_id = $1 AND ($2::text[] IS NULL OR s.student_id = ANY($2))
         ORDER BY p.full_name NULLS LAST",
    )
    .bind(course_id)
    .bind(student_ids)
    .fetch_all(pool)
    .await
}
