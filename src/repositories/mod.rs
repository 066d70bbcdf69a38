pub(crate) mod activity_files;
pub(crate) mod activity_submissions;
pub(crate) mod attendance;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod exam_scores;
pub(crate) mod notifications;
pub(crate) mod parent_students;
pub(crate) mod profiles;
pub(crate) mod session_participants;
pub(crate) mod sessions;
