use serde::Serialize;

use crate::services::grading::ProjectedGrade;

#[derive(Debug, Serialize)]
pub(crate) struct ProjectedGradeResponse {
    pub(crate) student_id: String,
    #[serde(flatten)]
    pub(crate) grade: ProjectedGrade,
    pub(crate) display_percentage: f64,
}

impl ProjectedGradeResponse {
    pub(crate) fn new(student_id: String, grade: ProjectedGrade) -> Self {
        Self { student_id, display_percentage: grade.display_percentage(), grade }
    }
}
