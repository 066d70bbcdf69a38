//! Attendance scan handling.
//!
//! A scan moves one (session, student) pair through NotJoined -> TimedIn -> TimedOut. Legacy
//! `student-<CODE>` scans toggle the newest open record of the (course, student) pair instead.
//! Steps run one after another with no transaction; the first failing step aborts the rest.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Attendance, SessionParticipant};
use crate::db::types::AttendanceStatus;
use crate::repositories;
use crate::repositories::attendance::CreateAttendance;
use crate::services::qr_payload::{self, ScannedCode, SessionQr, SessionQrKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ScanMode {
    /// Any session QR toggles time in / time out.
    #[default]
    Toggle,
    /// `session_join` only joins; `session_attendance` writes one complete record.
    TwoStep,
}

#[derive(Debug, Clone)]
pub(crate) struct ScanCourse {
    pub(crate) id: String,
    pub(crate) course_code: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ScanContext {
    pub(crate) student_id: String,
    /// Course the scanner was opened from.
    pub(crate) course: Option<ScanCourse>,
    pub(crate) mode: ScanMode,
    pub(crate) now: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanOutcome {
    TimedIn { attendance_id: String },
    TimedOut { attendance_id: String },
    AlreadyTimedOut,
    Joined,
    AlreadyJoined,
    NotJoined,
    Recorded { attendance_id: String },
    AlreadyRecorded,
    InvalidQr,
    WrongCourse,
}

impl ScanOutcome {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            ScanOutcome::TimedIn { .. } => "Time In Recorded",
            ScanOutcome::TimedOut { .. } => "Time Out Recorded",
            ScanOutcome::AlreadyTimedOut => "Already Timed Out",
            ScanOutcome::Joined => "Joined Session",
            ScanOutcome::AlreadyJoined => "Already Joined",
            ScanOutcome::NotJoined => "Not Joined",
            ScanOutcome::Recorded { .. } => "Attendance Recorded",
            ScanOutcome::AlreadyRecorded => "Already Recorded",
            ScanOutcome::InvalidQr => "Invalid QR Code",
            ScanOutcome::WrongCourse => "Wrong Course",
        }
    }

    pub(crate) fn message(&self) -> &'static str {
        match self {
            ScanOutcome::TimedIn { .. } => {
                "You have successfully timed in. Scan again to time out."
            }
            ScanOutcome::TimedOut { .. } => "Your time out has been recorded.",
            ScanOutcome::AlreadyTimedOut => "You have already timed in and out for this session.",
            ScanOutcome::Joined => {
                "You have joined the session. Scan the attendance QR code to be marked present."
            }
            ScanOutcome::AlreadyJoined => "You have already joined this session.",
            ScanOutcome::NotJoined => "Join the session before marking your attendance.",
            ScanOutcome::Recorded { .. } => "Your attendance has been recorded.",
            ScanOutcome::AlreadyRecorded => "Your attendance for this session is already recorded.",
            ScanOutcome::InvalidQr => "This QR code is not recognized.",
            ScanOutcome::WrongCourse => "This QR code is for a different course.",
        }
    }

    /// Metric label.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ScanOutcome::TimedIn { .. } => "timed_in",
            ScanOutcome::TimedOut { .. } => "timed_out",
            ScanOutcome::AlreadyTimedOut => "already_timed_out",
            ScanOutcome::Joined => "joined",
            ScanOutcome::AlreadyJoined => "already_joined",
            ScanOutcome::NotJoined => "not_joined",
            ScanOutcome::Recorded { .. } => "recorded",
            ScanOutcome::AlreadyRecorded => "already_recorded",
            ScanOutcome::InvalidQr => "invalid_qr",
            ScanOutcome::WrongCourse => "wrong_course",
        }
    }

    /// Notices are refusals that left the backend untouched.
    pub(crate) fn is_notice(&self) -> bool {
        matches!(
            self,
            ScanOutcome::AlreadyTimedOut
                | ScanOutcome::AlreadyJoined
                | ScanOutcome::NotJoined
                | ScanOutcome::AlreadyRecorded
                | ScanOutcome::InvalidQr
                | ScanOutcome::WrongCourse
        )
    }

    pub(crate) fn attendance_id(&self) -> Option<&str> {
        match self {
            ScanOutcome::TimedIn { attendance_id }
            | ScanOutcome::TimedOut { attendance_id }
            | ScanOutcome::Recorded { attendance_id } => Some(attendance_id),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ScanError {
    #[error("Failed to verify session participation.")]
    Participation(#[source] sqlx::Error),
    #[error("Could not determine the course for the attendance record.")]
    MissingCourse,
    #[error("Could not verify the session. Please try again.")]
    SessionLookup(#[source] sqlx::Error),
    #[error("Could not verify your attendance status. Please try again.")]
    AttendanceLookup(#[source] sqlx::Error),
    #[error("Failed to record your attendance.")]
    RecordTimeIn(#[source] sqlx::Error),
    #[error("Failed to record your time out.")]
    RecordTimeOut(#[source] sqlx::Error),
    #[error("Failed to record attendance.")]
    LegacyTimeIn(#[source] sqlx::Error),
    #[error("Failed to record your time-out.")]
    LegacyTimeOut(#[source] sqlx::Error),
}

impl ScanError {
    pub(crate) fn step(&self) -> &'static str {
        match self {
            ScanError::Participation(_) => "participation",
            ScanError::MissingCourse => "resolve_course",
            ScanError::SessionLookup(_) => "session_lookup",
            ScanError::AttendanceLookup(_) => "attendance_lookup",
            ScanError::RecordTimeIn(_) | ScanError::LegacyTimeIn(_) => "time_in",
            ScanError::RecordTimeOut(_) | ScanError::LegacyTimeOut(_) => "time_out",
        }
    }
}

#[async_trait]
pub(crate) trait AttendanceStore: Send + Sync {
    /// Course the session belongs to, `None` for an unknown session.
    async fn session_course_id(&self, session_id: &str) -> Result<Option<String>, sqlx::Error>;

    /// Upsert on (session, student) marking the participant present. Returns `joined_at`.
    async fn upsert_present_participant(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<PrimitiveDateTime>, sqlx::Error>;

    /// Insert without marking present. `None` when the pair already exists.
    async fn insert_participant(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<SessionParticipant>, sqlx::Error>;

    async fn find_participant(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> Result<Option<SessionParticipant>, sqlx::Error>;

    async fn mark_participant_present(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<(), sqlx::Error>;

    async fn find_session_attendance(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> Result<Option<Attendance>, sqlx::Error>;

    /// Newest (by `time_in`) record of the pair with no `time_out`.
    async fn find_open_course_attendance(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Option<Attendance>, sqlx::Error>;

    async fn insert_attendance(&self, params: CreateAttendance<'_>)
        -> Result<Attendance, sqlx::Error>;

    async fn set_time_out(
        &self,
        attendance_id: &str,
        time_out: PrimitiveDateTime,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl AttendanceStore for PgPool {
    async fn session_course_id(&self, session_id: &str) -> Result<Option<String>, sqlx::Error> {
        repositories::sessions::find_course_id(self, session_id).await
    }

    async fn upsert_present_participant(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<PrimitiveDateTime>, sqlx::Error> {
        repositories::session_participants::upsert_present(self, session_id, student_id, now)
            .await
            .map(|participant| Some(participant.joined_at))
    }

    async fn insert_participant(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<SessionParticipant>, sqlx::Error> {
        repositories::session_participants::insert_if_absent(self, session_id, student_id, now)
            .await
    }

    async fn find_participant(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> Result<Option<SessionParticipant>, sqlx::Error> {
        repositories::session_participants::find(self, session_id, student_id).await
    }

    async fn mark_participant_present(
        &self,
        session_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<(), sqlx::Error> {
        repositories::session_participants::mark_present(self, session_id, student_id, now).await
    }

    async fn find_session_attendance(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        repositories::attendance::find_for_session(self, session_id, student_id).await
    }

    async fn find_open_course_attendance(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        repositories::attendance::find_open_for_course(self, course_id, student_id).await
    }

    async fn insert_attendance(
        &self,
        params: CreateAttendance<'_>,
    ) -> Result<Attendance, sqlx::Error> {
        repositories::attendance::create(self, params).await
    }

    async fn set_time_out(
        &self,
        attendance_id: &str,
        time_out: PrimitiveDateTime,
    ) -> Result<(), sqlx::Error> {
        repositories::attendance::set_time_out(self, attendance_id, time_out).await
    }
}

pub(crate) async fn process_scan<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    raw: &str,
) -> Result<ScanOutcome, ScanError> {
    let code = match qr_payload::decode(raw) {
        Ok(code) => code,
        Err(_) => return Ok(ScanOutcome::InvalidQr),
    };

    let qr = match code {
        ScannedCode::Session(qr) => qr,
        ScannedCode::Legacy { course_code } => {
            return toggle_course_attendance(store, ctx, &course_code).await;
        }
    };

    let course_id = match session_course(store, ctx, &qr).await? {
        SessionCourse::Matches(course_id) => course_id,
        SessionCourse::Refused(outcome) => return Ok(outcome),
    };

    match ctx.mode {
        ScanMode::Toggle => toggle_session_attendance(store, ctx, &qr, &course_id).await,
        ScanMode::TwoStep => match qr.kind() {
            SessionQrKind::Join => join_session_once(store, ctx, &qr).await,
            SessionQrKind::Attendance => {
                record_complete_attendance(store, ctx, &qr, &course_id).await
            }
        },
    }
}

enum SessionCourse {
    Matches(String),
    Refused(ScanOutcome),
}

/// The stored session owns the course. A QR `courseId` or scanner course naming another
/// course is refused before anything is written.
async fn session_course<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    qr: &SessionQr,
) -> Result<SessionCourse, ScanError> {
    let Some(course_id) =
        store.session_course_id(qr.session_id()).await.map_err(ScanError::SessionLookup)?
    else {
        return Ok(SessionCourse::Refused(ScanOutcome::InvalidQr));
    };

    let qr_mismatch = qr.course_id().is_some_and(|id| id != course_id);
    let scanner_mismatch = ctx.course.as_ref().is_some_and(|course| course.id != course_id);
    if qr_mismatch || scanner_mismatch {
        return Ok(SessionCourse::Refused(ScanOutcome::WrongCourse));
    }

    Ok(SessionCourse::Matches(course_id))
}

async fn toggle_session_attendance<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    qr: &SessionQr,
    course_id: &str,
) -> Result<ScanOutcome, ScanError> {
    let session_id = qr.session_id();
    let joined_at = store
        .upsert_present_participant(session_id, &ctx.student_id, ctx.now)
        .await
        .map_err(ScanError::Participation)?;

    let existing = store
        .find_session_attendance(session_id, &ctx.student_id)
        .await
        .map_err(ScanError::AttendanceLookup)?;

    match existing {
        Some(record) if record.time_out.is_some() => Ok(ScanOutcome::AlreadyTimedOut),
        Some(record) => {
            store.set_time_out(&record.id, ctx.now).await.map_err(ScanError::RecordTimeOut)?;
            Ok(ScanOutcome::TimedOut { attendance_id: record.id })
        }
        None => {
            let attendance_id = Uuid::new_v4().to_string();
            store
                .insert_attendance(CreateAttendance {
                    id: &attendance_id,
                    course_id,
                    student_id: &ctx.student_id,
                    session_id: Some(session_id),
                    status: AttendanceStatus::Present,
                    marked_at: ctx.now,
                    time_in: Some(joined_at.unwrap_or(ctx.now)),
                    time_out: None,
                    created_at: ctx.now,
                })
                .await
                .map_err(ScanError::RecordTimeIn)?;
            Ok(ScanOutcome::TimedIn { attendance_id })
        }
    }
}

async fn join_session_once<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    qr: &SessionQr,
) -> Result<ScanOutcome, ScanError> {
    let inserted = store
        .insert_participant(qr.session_id(), &ctx.student_id, ctx.now)
        .await
        .map_err(ScanError::Participation)?;

    Ok(if inserted.is_some() { ScanOutcome::Joined } else { ScanOutcome::AlreadyJoined })
}

async fn record_complete_attendance<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    qr: &SessionQr,
    course_id: &str,
) -> Result<ScanOutcome, ScanError> {
    let session_id = qr.session_id();
    let Some(participant) = store
        .find_participant(session_id, &ctx.student_id)
        .await
        .map_err(ScanError::Participation)?
    else {
        return Ok(ScanOutcome::NotJoined);
    };

    let existing = store
        .find_session_attendance(session_id, &ctx.student_id)
        .await
        .map_err(ScanError::AttendanceLookup)?;
    if existing.is_some() {
        return Ok(ScanOutcome::AlreadyRecorded);
    }

    store
        .mark_participant_present(session_id, &ctx.student_id, ctx.now)
        .await
        .map_err(ScanError::Participation)?;

    let attendance_id = Uuid::new_v4().to_string();
    store
        .insert_attendance(CreateAttendance {
            id: &attendance_id,
            course_id,
            student_id: &ctx.student_id,
            session_id: Some(session_id),
            status: AttendanceStatus::Present,
            marked_at: ctx.now,
            time_in: Some(participant.joined_at),
            time_out: Some(ctx.now),
            created_at: ctx.now,
        })
        .await
        .map_err(ScanError::RecordTimeIn)?;

    Ok(ScanOutcome::Recorded { attendance_id })
}

async fn toggle_course_attendance<S: AttendanceStore + ?Sized>(
    store: &S,
    ctx: &ScanContext,
    scanned_code: &str,
) -> Result<ScanOutcome, ScanError> {
    let Some(course) = ctx.course.as_ref() else {
        return Err(ScanError::MissingCourse);
    };
    if course.course_code.as_deref() != Some(scanned_code) {
        return Ok(ScanOutcome::WrongCourse);
    }

    let open = store
        .find_open_course_attendance(&course.id, &ctx.student_id)
        .await
        .map_err(ScanError::AttendanceLookup)?;

    if let Some(record) = open {
        store.set_time_out(&record.id, ctx.now).await.map_err(ScanError::LegacyTimeOut)?;
        return Ok(ScanOutcome::TimedOut { attendance_id: record.id });
    }

    let attendance_id = Uuid::new_v4().to_string();
    store
        .insert_attendance(CreateAttendance {
            id: &attendance_id,
            course_id: &course.id,
            student_id: &ctx.student_id,
            session_id: None,
            status: AttendanceStatus::Present,
            marked_at: ctx.now,
            time_in: Some(ctx.now),
            time_out: None,
            created_at: ctx.now,
        })
        .await
        .map_err(ScanError::LegacyTimeIn)?;

    Ok(ScanOutcome::TimedIn { attendance_id })
}
