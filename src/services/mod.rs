pub(crate) mod attendance;
pub(crate) mod course_codes;
pub(crate) mod grading;
pub(crate) mod qr_payload;
