use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use validator::Validate;

use crate::core::time::{format_optional, format_primitive};
use crate::db::models::{ActivityFile, ActivitySubmission};
use crate::db::types::ActivityCategory;
use crate::repositories::activity_submissions::SubmissionWithActivity;
use crate::schemas::deserialize_option_datetime_flexible;

fn default_category() -> ActivityCategory {
    ActivityCategory::Activity
}

/// Metadata of an uploaded file. The bytes live in external storage.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ActivityCreate {
    #[serde(default = "default_category")]
    pub(crate) category: ActivityCategory,
    #[serde(default)]
    #[validate(range(min = 0, message = "points must be non-negative"))]
    pub(crate) points: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_option_datetime_flexible")]
    pub(crate) deadline: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(alias = "fileName")]
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub(crate) file_name: String,
    #[serde(alias = "filePath")]
    #[validate(length(min = 1, message = "file_path must not be empty"))]
    pub(crate) file_path: String,
    #[serde(alias = "fileSize")]
    #[validate(range(min = 0, message = "file_size must be non-negative"))]
    pub(crate) file_size: i64,
    #[serde(alias = "fileType")]
    pub(crate) file_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActivityResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) category: ActivityCategory,
    pub(crate) points: Option<i32>,
    pub(crate) deadline: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) file_name: String,
    pub(crate) file_path: String,
    pub(crate) file_size: i64,
    pub(crate) file_type: String,
    pub(crate) uploaded_by: String,
    pub(crate) uploaded_at: String,
}

impl ActivityResponse {
    pub(crate) fn from_db(activity: ActivityFile) -> Self {
        Self {
            id: activity.id,
            course_id: activity.course_id,
            category: activity.category,
            points: activity.points,
            deadline: format_optional(activity.deadline),
            description: activity.description,
            file_name: activity.file_name,
            file_path: activity.file_path,
            file_size: activity.file_size,
            file_type: activity.file_type,
            uploaded_by: activity.uploaded_by,
            uploaded_at: format_primitive(activity.uploaded_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionCreate {
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(alias = "fileName")]
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub(crate) file_name: String,
    #[serde(alias = "filePath")]
    #[validate(length(min = 1, message = "file_path must not be empty"))]
    pub(crate) file_path: String,
    #[serde(alias = "fileSize")]
    #[validate(range(min = 0, message = "file_size must be non-negative"))]
    pub(crate) file_size: i64,
    #[serde(alias = "fileType")]
    pub(crate) file_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
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
    pub(crate) submitted_at: String,
    pub(crate) is_late: bool,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: ActivitySubmission, deadline: Option<PrimitiveDateTime>) -> Self {
        let is_late = deadline.is_some_and(|deadline| submission.submitted_at > deadline);
        Self {
            id: submission.id,
            activity_file_id: submission.activity_file_id,
            student_id: submission.student_id,
            course_id: submission.course_id,
            awarded_points: submission.awarded_points,
            description: submission.description,
            file_name: submission.file_name,
            file_path: submission.file_path,
            file_size: submission.file_size,
            file_type: submission.file_type,
            submitted_at: format_primitive(submission.submitted_at),
            is_late,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSubmissionResponse {
    pub(crate) id: String,
    pub(crate) activity_file_id: String,
    pub(crate) activity_file_name: String,
    pub(crate) awarded_points: Option<i32>,
    pub(crate) max_points: Option<i32>,
    pub(crate) deadline: Option<String>,
    pub(crate) is_late: bool,
    pub(crate) description: Option<String>,
    pub(crate) file_name: String,
    pub(crate) file_path: String,
    pub(crate) file_size: i64,
    pub(crate) file_type: String,
    pub(crate) submitted_at: String,
}

impl StudentSubmissionResponse {
    pub(crate) fn from_db(row: SubmissionWithActivity) -> Self {
        let is_late = row.is_late();
        Self {
            id: row.id,
            activity_file_id: row.activity_file_id,
            activity_file_name: row.activity_file_name,
            awarded_points: row.awarded_points,
            max_points: row.max_points,
            deadline: format_optional(row.deadline),
            is_late,
            description: row.description,
            file_name: row.file_name,
            file_path: row.file_path,
            file_size: row.file_size,
            file_type: row.file_type,
            submitted_at: format_primitive(row.submitted_at),
        }
    }
}

/// `null` clears the grade.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AwardPointsRequest {
    #[serde(alias = "awardedPoints")]
    #[validate(range(min = 0, message = "awarded_points must be non-negative"))]
    pub(crate) awarded_points: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivityListQuery {
    #[serde(default)]
    pub(crate) category: Option<ActivityCategory>,
}
