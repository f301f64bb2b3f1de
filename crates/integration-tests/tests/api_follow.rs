//! Follow API: constraint-backed duplicate rejection, self-follow rejection,
//! per-actor listing and username search.

use axum::http::{Method, StatusCode};
use serde_json::json;

use integration_tests::*;

#[tokio::test]
async fn follow_requires_authentication() {
    let app = TestApp::spawn().await;
    let response = app.request(api_get("/api/v1/follow/", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/follow/",
            None,
            json!({ "author": "Author" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn follow_create_and_duplicate_rejection() {
    let app = TestApp::spawn().await;
    app.user("Author").await;
    let reader = app.user("Reader").await;
    let token = app.api_token(reader.id);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/follow/",
            Some(&token),
            json!({ "author": "Author" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let edge = body_json(response).await;
    assert_eq!(edge["user"], "Reader");
    assert_eq!(edge["author"], "Author");

    // The duplicate fails validation and leaves a single row behind.
    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/follow/",
            Some(&token),
            json!({ "author": "Author" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["author"].is_array());

    let listed = body_json(app.request(api_get("/api/v1/follow/", Some(&token))).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn self_follow_is_a_field_error() {
    let app = TestApp::spawn().await;
    let reader = app.user("Reader").await;
    let token = app.api_token(reader.id);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/follow/",
            Some(&token),
            json!({ "author": "Reader" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await;
    assert_eq!(errors["author"][0], "self-follow is forbidden");
}

#[tokio::test]
async fn unknown_followee_is_a_field_error() {
    let app = TestApp::spawn().await;
    let reader = app.user("Reader").await;
    let token = app.api_token(reader.id);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/follow/",
            Some(&token),
            json!({ "author": "Nobody" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["author"].is_array());
}

#[tokio::test]
async fn list_shows_only_the_actors_edges_with_search() {
    let app = TestApp::spawn().await;
    app.user("tolstoy").await;
    app.user("chekhov").await;
    let reader = app.user("reader").await;
    let rival = app.user("rival").await;
    let reader_token = app.api_token(reader.id);
    let rival_token = app.api_token(rival.id);

    for (token, author) in [
        (&reader_token, "tolstoy"),
        (&reader_token, "chekhov"),
        (&rival_token, "tolstoy"),
    ] {
        let response = app
            .request(json_request(
                Method::POST,
                "/api/v1/follow/",
                Some(token),
                json!({ "author": author }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listed = body_json(app.request(api_get("/api/v1/follow/", Some(&reader_token))).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let listed = body_json(app.request(api_get("/api/v1/follow/", Some(&rival_token))).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Substring search over the followee's username.
    let listed = body_json(
        app.request(api_get("/api/v1/follow/?search=olst", Some(&reader_token))).await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["author"], "tolstoy");
}
