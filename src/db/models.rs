use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{ActivityCategory, AttendanceStatus, SessionStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Profile {
    pub(crate) id: String,
    pub(crate) email: Option<String>,
    pub(crate) full_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) course_code: Option<String>,
    pub(crate) instructor_id: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Enrollment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ParentStudent {
    pub(crate) id: String,
    pub(crate) parent_id: String,
    pub(crate) student_id: String,
    pub(crate) linked_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ActivityFile {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) category: ActivityCategory,
    pub(crate) points: Option<i32>,
    pub(crate) deadline: Option<PrimitiveDateTime>,
    pub(crate) description: Option<String>,
    pub(crate) file_name: String,
    pub(crate) file_path: String,
    pub(crate) file_size: i64,
    pub(crate) file_type: String,
    pub(crate) uploaded_by: String,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ActivitySubmission {
    pub(crate) id: String,
    pub(crate) activity_file_id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) awarded_points: Option<i32>,
    pub(crate) description: Option<String>,
    pub(crate) file_name: String,
    pub(crate) file_path: String,
    pub(crate) file_size: i64,
    pub(crate) file_type: String,
    pub(crate) submitted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Attendance {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) session_id: Option<String>,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_at: PrimitiveDateTime,
    pub(crate) time_in: Option<PrimitiveDateTime>,
    pub(crate) time_out: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Session {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
    pub(crate) status: SessionStatus,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SessionParticipant {
    pub(crate) id: String,
    pub(crate) session_id: String,
    pub(crate) student_id: String,
    pub(crate) joined_at: PrimitiveDateTime,
    pub(crate) marked_present: bool,
    pub(crate) marked_present_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) message: String,
    #[sqlx(rename = "type")]
    pub(crate) kind: String,
    pub(crate) course_id: Option<String>,
    pub(crate) activity_file_id: Option<String>,
    pub(crate) is_read: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamScore {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) midterm_score: Option<f64>,
    pub(crate) final_score: Option<f64>,
    pub(crate) updated_at: PrimitiveDateTime,
}
