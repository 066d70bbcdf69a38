use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn owner_upserts_scores_and_students_see_their_own() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let instructor = test_support::insert_profile(db, "Zoe Instructor", UserRole::Instructor).await;
    let first = test_support::insert_profile(db, "Abe Student", UserRole::Student).await;
    let second = test_support::insert_profile(db, "Bea Student", UserRole::Student).await;
    let stranger = test_support::insert_profile(db, "Cy Student", UserRole::Student).await;
    let course = test_support::insert_course(db, "Economics", &instructor.id).await;
    test_support::enroll(db, &course.id, &first.id).await;
    test_support::enroll(db, &course.id, &second.id).await;

    let uri = format!("/api/v1/courses/{}/exam-scores", course.id);
    let instructor_token = test_support::bearer_token(&instructor.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&instructor_token),
            Some(json!({ "scores": [{ "student_id": stranger.id, "midterm_score": 50.0 }] })),
        ))
        .await
        .expect("upsert stranger");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&instructor_token),
            Some(json!({ "scores": [{ "student_id": first.id, "midterm_score": -1.0 }] })),
        ))
        .await
        .expect("upsert negative");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&instructor_token),
            Some(json!({ "scores": [
                { "student_id": first.id, "midterm_score": 88.0 },
                { "studentId": second.id, "midtermScore": 71.5, "finalScore": 90.0 }
            ] })),
        ))
        .await
        .expect("upsert scores");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&instructor_token),
            Some(json!({ "scores": [{ "student_id": first.id, "midterm_score": 88.0, "final_score": 93.0 }] })),
        ))
        .await
        .expect("update score");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &uri,
            Some(&test_support::bearer_token(&first.id, ctx.state.settings())),
            None,
        ))
        .await
        .expect("student scores");
    let body = test_support::read_json(response).await;
    let rows = body.as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["student_id"], first.id.as_str());
    assert_eq!(rows[0]["midterm_score"], 88.0);
    assert_eq!(rows[0]["final_score"], 93.0);
}
