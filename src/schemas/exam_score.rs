use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::repositories::exam_scores::ExamScoreWithName;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamScoreEntry {
    #[serde(alias = "studentId")]
    pub(crate) student_id: String,
    #[serde(default, alias = "midtermScore")]
    #[validate(range(min = 0.0, message = "midterm_score must be non-negative"))]
    pub(crate) midterm_score: Option<f64>,
    #[serde(default, alias = "finalScore")]
    #[validate(range(min = 0.0, message = "final_score must be non-negative"))]
    pub(crate) final_score: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamScoresUpsert {
    #[validate(nested)]
    pub(crate) scores: Vec<ExamScoreEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamScoreResponse {
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) midterm_score: Option<f64>,
    pub(crate) final_score: Option<f64>,
    pub(crate) updated_at: String,
}

impl ExamScoreResponse {
    pub(crate) fn from_db(row: ExamScoreWithName) -> Self {
        Self {
            student_id: row.student_id,
            full_name: row.full_name,
            midterm_score: row.midterm_score,
            final_score: row.final_score,
            updated_at: format_primitive(row.updated_at),
        }
    }
}
