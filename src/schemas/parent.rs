use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::repositories::parent_students::LinkedStudent;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LinkStudentRequest {
    #[serde(alias = "studentName", alias = "full_name")]
    #[validate(length(min = 1, max = 200, message = "student_name must be 1-200 characters"))]
    pub(crate) student_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkedStudentResponse {
    pub(crate) link_id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) linked_at: String,
}

impl LinkedStudentResponse {
    pub(crate) fn from_db(row: LinkedStudent) -> Self {
        Self {
            link_id: row.link_id,
            student_id: row.student_id,
            full_name: row.full_name,
            email: row.email,
            linked_at: format_primitive(row.linked_at),
        }
    }
}
