//! Text carried by the QR codes the app scans.
//!
//! Session codes are JSON objects discriminated on `type`. Anything that fails that schema is
//! tried as the legacy `student-<COURSE_CODE>` form before being rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::types::UserRole;

const LEGACY_STUDENT_PREFIX: &str = "student-";
const SESSION_JOIN: &str = "session_join";
const SESSION_ATTENDANCE: &str = "session_attendance";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum QrPayloadError {
    #[error("QR code is not a recognized Trackademic code")]
    Unrecognized,
    #[error("enrollment QR codes are only issued for students and parents")]
    UnsupportedRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SessionQrKind {
    Join,
    Attendance,
}

impl SessionQrKind {
    fn as_type_str(self) -> &'static str {
        match self {
            SessionQrKind::Join => SESSION_JOIN,
            SessionQrKind::Attendance => SESSION_ATTENDANCE,
        }
    }
}

/// A validated session payload. Identifiers are canonical lower-case hyphenated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionQr {
    Join { session_id: String, course_id: Option<String> },
    Attendance { session_id: String, course_id: String },
}

impl SessionQr {
    pub(crate) fn session_id(&self) -> &str {
        match self {
            SessionQr::Join { session_id, .. } | SessionQr::Attendance { session_id, .. } => {
                session_id
            }
        }
    }

    pub(crate) fn course_id(&self) -> Option<&str> {
        match self {
            SessionQr::Join { course_id, .. } => course_id.as_deref(),
            SessionQr::Attendance { course_id, .. } => Some(course_id),
        }
    }

    pub(crate) fn kind(&self) -> SessionQrKind {
        match self {
            SessionQr::Join { .. } => SessionQrKind::Join,
            SessionQr::Attendance { .. } => SessionQrKind::Attendance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScannedCode {
    Session(SessionQr),
    Legacy { course_code: String },
}

#[derive(Debug, Deserialize)]
/// Unknown keys such as `timestamp` are ignored.
#[serde(rename_all = "camelCase")]
struct RawSessionQr {
    #[serde(rename = "type")]
    kind: String,
    session_id: String,
    #[serde(default)]
    course_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionQrOut<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    #[serde(rename = "courseId")]
    course_id: &'a str,
}

pub(crate) fn decode(raw: &str) -> Result<ScannedCode, QrPayloadError> {
    if let Some(session) = decode_session(raw) {
        return Ok(ScannedCode::Session(session));
    }

    raw.strip_prefix(LEGACY_STUDENT_PREFIX)
        .map(|course_code| ScannedCode::Legacy { course_code: course_code.to_string() })
        .ok_or(QrPayloadError::Unrecognized)
}

fn decode_session(raw: &str) -> Option<SessionQr> {
    let parsed: RawSessionQr = serde_json::from_str(raw).ok()?;
    let session_id = canonical_uuid(&parsed.session_id)?;
    let course_id = match parsed.course_id.as_deref() {
        Some(value) => Some(canonical_uuid(value)?),
        None => None,
    };

    match parsed.kind.as_str() {
        SESSION_JOIN => Some(SessionQr::Join { session_id, course_id }),
        SESSION_ATTENDANCE => Some(SessionQr::Attendance { session_id, course_id: course_id? }),
        _ => None,
    }
}

/// Only the 36-character hyphenated form is accepted.
fn canonical_uuid(value: &str) -> Option<String> {
    if value.len() != 36 {
        return None;
    }
    Uuid::try_parse(value).ok().map(|id| id.hyphenated().to_string())
}

/// JSON text shown to students during a session. Field order is `type`, `sessionId`, `courseId`.
pub(crate) fn encode_session_qr(
    kind: SessionQrKind,
    session_id: &str,
    course_id: &str,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SessionQrOut { kind: kind.as_type_str(), session_id, course_id })
}

pub(crate) fn encode_enrollment_qr(role: UserRole, course_code: &str) -> Result<String, QrPayloadError> {
    match role {
        UserRole::Student | UserRole::Parent => Ok(format!("{}-{}", role.as_str(), course_code)),
        UserRole::Instructor => Err(QrPayloadError::UnsupportedRole),
    }
}

/// Accepts either a bare course code or scanned `student-<CODE>` text.
pub(crate) fn enrollment_code_from_text(text: &str) -> String {
    let trimmed = text.trim();
    trimmed.strip_prefix(LEGACY_STUDENT_PREFIX).unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = "5f0c7a5e-3a51-4d2e-9a43-2b1f9c6d8e01";
    const COURSE: &str = "0b6f3a7c-91d2-4c1e-8f5a-6e7d2c9b1a34";

    #[test]
    fn decodes_session_join_without_course() {
        let raw = format!(r#"{{"type":"session_join","sessionId":"{SESSION}"}}"#);
        assert_eq!(
            decode(&raw),
            Ok(ScannedCode::Session(SessionQr::Join {
                session_id: SESSION.to_string(),
                course_id: None
            }))
        );
    }

    #[test]
    fn session_attendance_requires_course() {
        let raw = format!(r#"{{"type":"session_attendance","sessionId":"{SESSION}"}}"#);
        assert_eq!(decode(&raw), Err(QrPayloadError::Unrecognized));

        let raw = format!(
            r#"{{"type":"session_attendance","sessionId":"{SESSION}","courseId":"{COURSE}"}}"#
        );
        let decoded = decode(&raw).expect("decoded");
        let ScannedCode::Session(session) = decoded else { panic!("expected session payload") };
        assert_eq!(session.kind(), SessionQrKind::Attendance);
        assert_eq!(session.course_id(), Some(COURSE));
    }

    #[test]
    fn accepts_timestamped_dialog_payload() {
        let raw = format!(
            r#"{{"type":"session_join","sessionId":"{SESSION}","courseId":"{COURSE}","timestamp":1740819600000}}"#
        );
        assert_eq!(
            decode(&raw),
            Ok(ScannedCode::Session(SessionQr::Join {
                session_id: SESSION.to_string(),
                course_id: Some(COURSE.to_string())
            }))
        );
    }

    #[test]
    fn rejects_non_uuid_ids_and_unknown_types() {
        let short = r#"{"type":"session_join","sessionId":"abc"}"#;
        assert_eq!(decode(short), Err(QrPayloadError::Unrecognized));

        let simple = format!(r#"{{"type":"session_join","sessionId":"{}"}}"#, SESSION.replace('-', ""));
        assert_eq!(decode(&simple), Err(QrPayloadError::Unrecognized));

        let kind = format!(r#"{{"type":"session_leave","sessionId":"{SESSION}"}}"#);
        assert_eq!(decode(&kind), Err(QrPayloadError::Unrecognized));
    }

    #[test]
    fn uppercase_uuid_is_canonicalized() {
        let raw = format!(r#"{{"type":"session_join","sessionId":"{}"}}"#, SESSION.to_uppercase());
        let ScannedCode::Session(session) = decode(&raw).expect("decoded") else {
            panic!("expected session payload")
        };
        assert_eq!(session.session_id(), SESSION);
    }

    #[test]
    fn falls_back_to_legacy_student_code() {
        assert_eq!(
            decode("student-AB3KQ9"),
            Ok(ScannedCode::Legacy { course_code: "AB3KQ9".to_string() })
        );
        assert_eq!(decode("student-"), Ok(ScannedCode::Legacy { course_code: String::new() }));
        assert_eq!(decode("parent-AB3KQ9"), Err(QrPayloadError::Unrecognized));
        assert_eq!(decode("hello"), Err(QrPayloadError::Unrecognized));
        assert_eq!(decode("{not json"), Err(QrPayloadError::Unrecognized));
    }

    #[test]
    fn encoded_session_qr_matches_wire_format() {
        let text = encode_session_qr(SessionQrKind::Attendance, SESSION, COURSE).expect("encode");
        assert_eq!(
            text,
            format!(r#"{{"type":"session_attendance","sessionId":"{SESSION}","courseId":"{COURSE}"}}"#)
        );
        assert!(matches!(decode(&text), Ok(ScannedCode::Session(SessionQr::Attendance { .. }))));
    }

    #[test]
    fn enrollment_qr_text() {
        assert_eq!(encode_enrollment_qr(UserRole::Student, "AB3KQ9").as_deref(), Ok("student-AB3KQ9"));
        assert_eq!(encode_enrollment_qr(UserRole::Parent, "AB3KQ9").as_deref(), Ok("parent-AB3KQ9"));
        assert_eq!(
            encode_enrollment_qr(UserRole::Instructor, "AB3KQ9"),
            Err(QrPayloadError::UnsupportedRole)
        );
        assert_eq!(enrollment_code_from_text(" student-ab3kq9 "), "ab3kq9");
        assert_eq!(enrollment_code_from_text("AB3KQ9"), "AB3KQ9");
    }
}
