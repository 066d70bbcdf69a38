use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn instructor_creates_course_and_student_enrolls_by_code() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_profile(ctx.state.db(), "Ada Instructor", UserRole::Instructor).await;
    let student =
        test_support::insert_profile(ctx.state.db(), "Ben Student", UserRole::Student).await;
    let instructor_token = test_support::bearer_token(&instructor.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&instructor_token),
            Some(json!({ "title": "  Algebra I ", "description": "Linear equations" })),
        ))
        .await
        .expect("create course");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["title"], "Algebra I");
    let course_id = created["id"].as_str().expect("course id").to_string();
    let code = created["course_code"].as_str().expect("course code").to_string();
    assert_eq!(code.len(), 6);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses/enroll",
            Some(&student_token),
            Some(json!({ "code": format!("student-{}", code.to_lowercase()) })),
        ))
        .await
        .expect("enroll");

    let status = response.status();
    let enrolled = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {enrolled}");
    assert_eq!(enrolled["course_id"], course_id.as_str());
    assert_eq!(enrolled["course_title"], "Algebra I");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses/enroll",
            Some(&student_token),
            Some(json!({ "courseCode": code })),
        ))
        .await
        .expect("enroll again");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["detail"], "You are already enrolled in this course.");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/courses",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list courses");
    let body = test_support::read_json(response).await;
    let courses = body.as_array().expect("courses");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["id"], course_id.as_str());
}

#[tokio::test]
async fn enroll_with_unknown_code_is_not_found() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_profile(ctx.state.db(), "Cara Student", UserRole::Student).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses/enroll",
            Some(&token),
            Some(json!({ "code": "ZZZZZZ" })),
        ))
        .await
        .expect("enroll");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Invalid course code. Please check and try again.");
}

#[tokio::test]
async fn enrollment_qr_is_owner_only() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_profile(ctx.state.db(), "Owner Instructor", UserRole::Instructor)
            .await;
    let other =
        test_support::insert_profile(ctx.state.db(), "Other Instructor", UserRole::Instructor)
            .await;
    let course = test_support::insert_course(ctx.state.db(), "Biology", &owner.id).await;
    let code = course.course_code.clone().expect("code");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/enrollment-qr", course.id),
            Some(&test_support::bearer_token(&owner.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("qr");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["student_qr"], format!("student-{code}"));
    assert_eq!(body["parent_qr"], format!("parent-{code}"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{}/enrollment-qr", course.id),
            Some(&test_support::bearer_token(&other.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("qr as other");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_can_delete_course() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_profile(ctx.state.db(), "Dana Instructor", UserRole::Instructor)
            .await;
    let student =
        test_support::insert_profile(ctx.state.db(), "Eli Student", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "Chemistry", &owner.id).await;
    test_support::enroll(ctx.state.db(), &course.id, &student.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/courses/{}", course.id),
            Some(&test_support::bearer_token(&student.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("delete as student");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/courses/{}", course.id),
            Some(&test_support::bearer_token(&owner.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("delete course");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let found =
        repositories::courses::find_by_id(ctx.state.db(), &course.id).await.expect("find course");
    assert!(found.is_none());
}
