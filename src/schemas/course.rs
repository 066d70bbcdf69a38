use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, Enrollment};
use crate::repositories::enrollments::EnrolledStudent;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) course_code: Option<String>,
    pub(crate) instructor_id: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            course_code: course.course_code,
            instructor_id: course.instructor_id,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

/// Either a bare course code or the scanned enrollment QR text.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EnrollRequest {
    #[serde(alias = "courseCode", alias = "qr_text", alias = "qrText")]
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub(crate) code: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollResponse {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) enrolled_at: String,
}

impl EnrollResponse {
    pub(crate) fn from_db(enrollment: Enrollment, course_title: String) -> Self {
        Self {
            enrollment_id: enrollment.id,
            course_id: enrollment.course_id,
            course_title,
            enrolled_at: format_primitive(enrollment.enrolled_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentQrResponse {
    pub(crate) course_id: String,
    pub(crate) course_code: String,
    pub(crate) student_qr: String,
    pub(crate) parent_qr: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledStudentResponse {
    pub(crate) enrollment_id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) enrolled_at: String,
}

impl EnrolledStudentResponse {
    pub(crate) fn from_db(row: EnrolledStudent) -> Self {
        Self {
            enrollment_id: row.enrollment_id,
            student_id: row.student_id,
            full_name: row.full_name,
            email: row.email,
            enrolled_at: format_primitive(row.enrolled_at),
        }
    }
}
