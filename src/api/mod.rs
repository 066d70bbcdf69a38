pub(crate) mod activities;
pub(crate) mod attendance;
pub(crate) mod courses;
pub(crate) mod errors;
pub(crate) mod exam_scores;
pub(crate) mod grades;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod notifications;
pub(crate) mod parents;
pub(crate) mod profiles;
pub(crate) mod router;
pub(crate) mod sessions;
