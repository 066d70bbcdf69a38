use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::types::{AttendanceStatus, UserRole};
use crate::repositories;
use crate::test_support;

async fn insert_attendance(
    pool: &sqlx::PgPool,
    course_id: &str,
    student_id: &str,
    status: AttendanceStatus,
) {
    let now = primitive_now_utc();
    repositories::attendance::create(
        pool,
        repositories::attendance::CreateAttendance {
            id: &Uuid::new_v4().to_string(),
            course_id,
            student_id,
            session_id: None,
            status,
            marked_at: now,
            time_in: Some(now),
            time_out: Some(now),
            created_at: now,
        },
    )
    .await
    .expect("insert attendance");
}

#[tokio::test]
async fn projected_grade_combines_points_and_attendance() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let instructor = test_support::insert_profile(db, "Gail Instructor", UserRole::Instructor).await;
    let student = test_support::insert_profile(db, "Hank Student", UserRole::Student).await;
    let outsider = test_support::insert_profile(db, "Olive Student", UserRole::Student).await;
    let course = test_support::insert_course(db, "Statistics", &instructor.id).await;
    test_support::enroll(db, &course.id, &student.id).await;

    let instructor_token = test_support::bearer_token(&instructor.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/activities", course.id),
            Some(&instructor_token),
            Some(json!({
                "category": "activity",
                "points": 100,
                "file_name": "worksheet.pdf",
                "file_path": "courses/statistics/worksheet.pdf",
                "file_size": 2048,
                "file_type": "application/pdf"
            })),
        ))
        .await
        .expect("create activity");
    let status = response.status();
    let activity = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {activity}");
    let activity_id = activity["id"].as_str().expect("activity id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/activities/{activity_id}/submissions", course.id),
            Some(&student_token),
            Some(json!({
                "file_name": "answers.pdf",
                "file_path": "submissions/answers.pdf",
                "file_size": 1024,
                "file_type": "application/pdf"
            })),
        ))
        .await
        .expect("submit");
    let status = response.status();
    let submission = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {submission}");
    let submission_id = submission["id"].as_str().expect("submission id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/courses/{}/submissions/{submission_id}/points", course.id),
            Some(&instructor_token),
            Some(json!({ "awarded_points": 80 })),
        ))
        .await
        .expect("award points");
    assert_eq!(response.status(), StatusCode::OK);

    for status in [
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
    ] {
        insert_attendance(db, &course.id, &student.id, status).await;
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/students/{}/projected-grade", course.id, student.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("projected grade");
    let status = response.status();
    let grade = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {grade}");
    assert_eq!(grade["display_percentage"], 78.5);
    assert_eq!(grade["letter_grade"], "C");
    assert_eq!(grade["activities_earned"], 80);
    assert_eq!(grade["present_count"], 3);
    assert_eq!(grade["total_attendance"], 4);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/projected-grades", course.id),
            Some(&instructor_token),
            None,
        ))
        .await
        .expect("course grades");
    let grades = test_support::read_json(response).await;
    let grades = grades.as_array().expect("grades");
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0]["student_id"], student.id.as_str());
    assert_eq!(grades[0]["letter_grade"], "C");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/students/{}/projected-grade", course.id, student.id),
            Some(&test_support::bearer_token(&outsider.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("outsider grade");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_without_records_gets_ungraded() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let instructor = test_support::insert_profile(db, "Kim Instructor", UserRole::Instructor).await;
    let student = test_support::insert_profile(db, "Lou Student", UserRole::Student).await;
    let course = test_support::insert_course(db, "Music", &instructor.id).await;
    test_support::enroll(db, &course.id, &student.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/students/{}/projected-grade", course.id, student.id),
            Some(&test_support::bearer_token(&instructor.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("projected grade");
    let grade = test_support::read_json(response).await;
    assert_eq!(grade["percentage"], 0.0);
    assert_eq!(grade["letter_grade"], "-");
}
