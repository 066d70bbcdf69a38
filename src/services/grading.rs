//! Projected course grade from activity points and attendance.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::types::AttendanceStatus;
use crate::repositories;

pub(crate) const ACTIVITIES_WEIGHT: f64 = 0.7;
pub(crate) const ATTENDANCE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
    #[default]
    #[serde(rename = "-")]
    Ungraded,
}

impl LetterGrade {
    /// `Ungraded` unless the percentage is strictly positive.
    pub(crate) fn from_percentage(percentage: f64) -> Self {
        if percentage.is_nan() || percentage <= 0.0 {
            return LetterGrade::Ungraded;
        }
        if percentage >= 90.0 {
            LetterGrade::A
        } else if percentage >= 80.0 {
            LetterGrade::B
        } else if percentage >= 70.0 {
            LetterGrade::C
        } else if percentage >= 60.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct GradeInputs {
    pub(crate) activities_earned: i64,
    pub(crate) activities_total: i64,
    pub(crate) present_count: i64,
    pub(crate) total_attendance: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub(crate) struct ProjectedGrade {
    pub(crate) percentage: f64,
    pub(crate) letter_grade: LetterGrade,
    pub(crate) activities_score: f64,
    pub(crate) attendance_score: f64,
    pub(crate) activities_earned: i64,
    pub(crate) activities_total: i64,
    pub(crate) present_count: i64,
    pub(crate) total_attendance: i64,
}

impl ProjectedGrade {
    /// Percentage rounded to one decimal for display. `percentage` itself is never rounded.
    pub(crate) fn display_percentage(&self) -> f64 {
        (self.percentage * 10.0).round() / 10.0
    }
}

pub(crate) fn compute_projected_grade(inputs: GradeInputs) -> ProjectedGrade {
    let activities_score = if inputs.activities_total > 0 {
        (inputs.activities_earned as f64 / inputs.activities_total as f64 * 100.0).min(100.0)
    } else {
        0.0
    };

    let attendance_score = if inputs.total_attendance > 0 {
        inputs.present_count as f64 / inputs.total_attendance as f64 * 100.0
    } else {
        0.0
    };

    let percentage = if inputs.activities_total > 0 || inputs.total_attendance > 0 {
        activities_score * ACTIVITIES_WEIGHT + attendance_score * ATTENDANCE_WEIGHT
    } else {
        0.0
    };

    ProjectedGrade {
        percentage,
        letter_grade: LetterGrade::from_percentage(percentage),
        activities_score,
        attendance_score,
        activities_earned: inputs.activities_earned,
        activities_total: inputs.activities_total,
        present_count: inputs.present_count,
        total_attendance: inputs.total_attendance,
    }
}

/// Rows the grade is computed from. Every method is scoped to one course.
#[async_trait]
pub(crate) trait GradeSource: Send + Sync {
    /// `points` of every `activity`-category definition.
    async fn activity_points(&self, course_id: &str) -> Result<Vec<Option<i32>>, sqlx::Error>;

    /// `(student_id, awarded_points)` of every submission by the given students.
    async fn awarded_points(
        &self,
        course_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<(String, Option<i32>)>, sqlx::Error>;

    /// `(student_id, status)` of every attendance row of the given students.
    async fn attendance_statuses(
        &self,
        course_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<(String, AttendanceStatus)>, sqlx::Error>;
}

#[async_trait]
impl GradeSource for PgPool {
    async fn activity_points(&self, course_id: &str) -> Result<Vec<Option<i32>>, sqlx::Error> {
        repositories::activity_files::list_graded_points(self, course_id).await
    }

    async fn awarded_points(
        &self,
        course_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<(String, Option<i32>)>, sqlx::Error> {
        repositories::activity_submissions::list_awarded_points(self, course_id, student_ids).await
    }

    async fn attendance_statuses(
        &self,
        course_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<(String, AttendanceStatus)>, sqlx::Error> {
        repositories::attendance::list_statuses(self, course_id, student_ids).await
    }
}

/// Never fails: a fetch error is logged and the zeroed grade is returned.
pub(crate) async fn projected_grade_for_student<S: GradeSource + ?Sized>(
    source: &S,
    course_id: &str,
    student_id: &str,
) -> ProjectedGrade {
    let student_ids = [student_id.to_string()];
    match projected_grades_for_students(source, course_id, &student_ids).await {
        Ok(mut grades) => grades.remove(student_id).unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                course_id = %course_id,
                student_id = %student_id,
                "Failed to load projected grade inputs"
            );
            ProjectedGrade::default()
        }
    }
}

pub(crate) async fn projected_grades_for_students<S: GradeSource + ?Sized>(
    source: &S,
    course_id: &str,
    student_ids: &[String],
) -> Result<HashMap<String, ProjectedGrade>, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let (points, awarded, statuses) = tokio::try_join!(
        source.activity_points(course_id),
        source.awarded_points(course_id, student_ids),
        source.attendance_statuses(course_id, student_ids),
    )?;

    let activities_total: i64 = points.into_iter().map(|value| i64::from(value.unwrap_or(0))).sum();

    let mut earned_by_student: HashMap<String, i64> = HashMap::new();
    for (student_id, awarded_points) in awarded {
        *earned_by_student.entry(student_id).or_default() += i64::from(awarded_points.unwrap_or(0));
    }

    let mut attendance_by_student: HashMap<String, (i64, i64)> = HashMap::new();
    for (student_id, status) in statuses {
        let entry = attendance_by_student.entry(student_id).or_default();
        entry.1 += 1;
        if status == AttendanceStatus::Present {
            entry.0 += 1;
        }
    }

    let grades = student_ids
        .iter()
        .map(|student_id| {
            let (present_count, total_attendance) =
                attendance_by_student.get(student_id).copied().unwrap_or_default();
            let grade = compute_projected_grade(GradeInputs {
                activities_earned: earned_by_student.get(student_id).copied().unwrap_or(0),
                activities_total,
                present_count,
                total_attendance,
            });
            (student_id.clone(), grade)
        })
        .collect();

    Ok(grades)
}
