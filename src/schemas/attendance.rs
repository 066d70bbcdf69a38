use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_optional, format_primitive};
use crate::db::models::Session;
use crate::db::types::{AttendanceStatus, SessionStatus};
use crate::repositories::attendance::AttendanceHistoryRow;
use crate::repositories::session_participants::ParticipantWithName;
use crate::services::attendance::ScanOutcome;
use crate::services::qr_payload::SessionQrKind;

pub(crate) const DEFAULT_HISTORY_LIMIT: i64 = 200;

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) status: SessionStatus,
    pub(crate) started_at: String,
    pub(crate) ended_at: Option<String>,
    pub(crate) created_at: String,
}

impl SessionResponse {
    pub(crate) fn from_db(session: Session) -> Self {
        Self {
            id: session.id,
            course_id: session.course_id,
            status: session.status,
            started_at: format_primitive(session.started_at),
            ended_at: format_optional(session.ended_at),
            created_at: format_primitive(session.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EndSessionResponse {
    pub(crate) session: SessionResponse,
    pub(crate) present_count: i64,
}

fn default_qr_kind() -> SessionQrKind {
    SessionQrKind::Join
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionQrQuery {
    #[serde(default = "default_qr_kind")]
    pub(crate) kind: SessionQrKind,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionQrResponse {
    pub(crate) session_id: String,
    pub(crate) course_id: String,
    pub(crate) qr_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ParticipantResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) full_name: Option<String>,
    pub(crate) joined_at: String,
    pub(crate) marked_present: bool,
    pub(crate) marked_present_at: Option<String>,
}

impl ParticipantResponse {
    pub(crate) fn from_db(row: ParticipantWithName) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            full_name: row.full_name,
            joined_at: format_primitive(row.joined_at),
            marked_present: row.marked_present,
            marked_present_at: format_optional(row.marked_present_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ScanRequest {
    #[serde(alias = "qrText", alias = "decoded_text", alias = "decodedText")]
    #[validate(length(min = 1, message = "qr_text must not be empty"))]
    pub(crate) qr_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScanResponse {
    pub(crate) outcome: &'static str,
    pub(crate) title: &'static str,
    pub(crate) message: &'static str,
    pub(crate) notice: bool,
    pub(crate) attendance_id: Option<String>,
}

impl ScanResponse {
    pub(crate) fn from_outcome(outcome: &ScanOutcome) -> Self {
        Self {
            outcome: outcome.label(),
            title: outcome.title(),
            message: outcome.message(),
            notice: outcome.is_notice(),
            attendance_id: outcome.attendance_id().map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceQuery {
    #[serde(default)]
    pub(crate) student_id: Option<String>,
    #[serde(default)]
    pub(crate) complete_only: bool,
    #[serde(default)]
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceRecordResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_at: String,
    pub(crate) time_in: Option<String>,
    pub(crate) time_out: Option<String>,
    pub(crate) is_complete: bool,
}

impl AttendanceRecordResponse {
    pub(crate) fn from_db(row: AttendanceHistoryRow) -> Self {
        let is_complete = row.time_in.is_some() && row.time_out.is_some();
        Self {
            id: row.id,
            course_id: row.course_id,
            student_id: row.student_id,
            student_name: row.student_name,
            session_id: row.session_id,
            status: row.status,
            marked_at: format_primitive(row.marked_at),
            time_in: format_optional(row.time_in),
            time_out: format_optional(row.time_out),
            is_complete,
        }
    }
}
