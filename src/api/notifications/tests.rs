use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn posting_lecture_notifies_enrolled_students() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let instructor = test_support::insert_profile(db, "Wes Instructor", UserRole::Instructor).await;
    let enrolled = test_support::insert_profile(db, "Xena Student", UserRole::Student).await;
    let bystander = test_support::insert_profile(db, "Yuri Student", UserRole::Student).await;
    let course = test_support::insert_course(db, "Philosophy", &instructor.id).await;
    test_support::enroll(db, &course.id, &enrolled.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/activities", course.id),
            Some(&test_support::bearer_token(&instructor.id, ctx.state.settings())),
            Some(json!({
                "category": "lecture",
                "fileName": "week1.pdf",
                "filePath": "courses/philosophy/week1.pdf",
                "fileSize": 4096,
                "fileType": "application/pdf"
            })),
        ))
        .await
        .expect("create lecture");
    assert_eq!(response.status(), StatusCode::CREATED);

    let enrolled_token = test_support::bearer_token(&enrolled.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/notifications",
            Some(&enrolled_token),
            None,
        ))
        .await
        .expect("list notifications");
    let body = test_support::read_json(response).await;
    assert_eq!(body["unread_count"], 1);
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "lecture");
    assert_eq!(items[0]["title"], "New lecture material posted");
    assert_eq!(items[0]["message"], "week1.pdf was posted in Philosophy");
    let notification_id = items[0]["id"].as_str().expect("id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/notifications/{notification_id}/read"),
            Some(&test_support::bearer_token(&bystander.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("read as other user");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notifications/read-all",
            Some(&enrolled_token),
            None,
        ))
        .await
        .expect("read all");
    let body = test_support::read_json(response).await;
    assert_eq!(body["updated"], 1);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/notifications",
            Some(&test_support::bearer_token(&bystander.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("bystander notifications");
    let body = test_support::read_json(response).await;
    assert_eq!(body["unread_count"], 0);
}
