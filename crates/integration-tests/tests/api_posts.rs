//! JSON API: token issuance, the post lifecycle with its permission matrix,
//! nested comments, groups and limit/offset pagination.

use axum::http::{Method, StatusCode};
use base64::Engine;
use serde_json::json;

use integration_tests::*;

#[tokio::test]
async fn jwt_create_refresh_and_verify() {
    let app = TestApp::spawn().await;
    app.user("Author").await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/jwt/create/",
            None,
            json!({ "username": "Author", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let access = tokens["access"].as_str().unwrap().to_string();
    let refresh = tokens["refresh"].as_str().unwrap().to_string();

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/jwt/refresh/",
            None,
            json!({ "refresh": refresh }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["access"].is_string());

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/jwt/verify/",
            None,
            json!({ "token": access }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/jwt/verify/",
            None,
            json!({ "token": "garbage" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn jwt_create_rejects_bad_credentials_uniformly() {
    let app = TestApp::spawn().await;
    app.user("Author").await;

    for body in [
        json!({ "username": "Author", "password": "wrong" }),
        json!({ "username": "Nobody", "password": PASSWORD }),
    ] {
        let response = app
            .request(json_request(Method::POST, "/api/v1/jwt/create/", None, body))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn post_lifecycle_with_permission_matrix() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let other = app.user("Other").await;
    let author_token = app.api_token(author.id);
    let other_token = app.api_token(other.id);

    // Anonymous create is a 401.
    let response = app
        .request(json_request(Method::POST, "/api/v1/posts/", None, json!({ "text": "hi" })))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated create is a 201 with the author filled in server-side.
    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/posts/",
            Some(&author_token),
            json!({ "text": "Тестовый текст" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["author"], "Author");
    assert!(created["group"].is_null());
    let id = created["id"].as_i64().unwrap();

    // Retrieve is open to everyone.
    let response = app.request(api_get(&format!("/api/v1/posts/{id}/"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "Тестовый текст");

    // Non-author mutation is a 403, anonymous a 401.
    let response = app
        .request(json_request(
            Method::PUT,
            &format!("/api/v1/posts/{id}/"),
            Some(&other_token),
            json!({ "text": "hijacked" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(json_request(
            Method::PUT,
            &format!("/api/v1/posts/{id}/"),
            None,
            json!({ "text": "hijacked" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The author updates and finally deletes.
    let response = app
        .request(json_request(
            Method::PATCH,
            &format!("/api/v1/posts/{id}/"),
            Some(&author_token),
            json!({ "text": "Изменен" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "Изменен");

    let response = app
        .request(json_request(
            Method::DELETE,
            &format!("/api/v1/posts/{id}/"),
            Some(&other_token),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(json_request(
            Method::DELETE,
            &format!("/api/v1/posts/{id}/"),
            Some(&author_token),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.request(api_get(&format!("/api/v1/posts/{id}/"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_create_validates_text_and_group() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let token = app.api_token(author.id);

    let response = app
        .request(json_request(Method::POST, "/api/v1/posts/", Some(&token), json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await;
    assert!(errors["text"].is_array());

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/posts/",
            Some(&token),
            json!({ "text": "hi", "group": 999 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await;
    assert!(errors["group"].is_array());
}

#[tokio::test]
async fn post_accepts_base64_image_and_serves_a_media_url() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let token = app.api_token(author.id);
    let payload = base64::engine::general_purpose::STANDARD.encode(SMALL_GIF);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/posts/",
            Some(&token),
            json!({ "text": "с картинкой", "image": payload }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let url = created["image"].as_str().expect("image url");
    assert!(url.starts_with("/media/"));
    assert!(url.ends_with(".gif"));

    // The decoded blob really exists under the media root.
    let media_id = url.trim_start_matches("/media/");
    assert!(app.media_dir.path().join(media_id).exists());

    // Garbage base64 is a field error, not a 500.
    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/posts/",
            Some(&token),
            json!({ "text": "x", "image": "!!!" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["image"].is_array());
}

#[tokio::test]
async fn post_list_paginates_with_limit_offset() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    for i in 0..13 {
        app.post(author.id, None, &format!("numbered {i}")).await;
    }

    // Bare list: plain array of everything.
    let response = app.request(api_get("/api/v1/posts/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let plain = body_json(response).await;
    assert_eq!(plain.as_array().unwrap().len(), 13);

    // Parameterized list: envelope with count/next/previous.
    let response = app.request(api_get("/api/v1/posts/?limit=10", None)).await;
    let page = body_json(response).await;
    assert_eq!(page["count"], 13);
    assert_eq!(page["results"].as_array().unwrap().len(), 10);
    assert_eq!(page["next"], "/api/v1/posts/?limit=10&offset=10");
    assert!(page["previous"].is_null());

    let response = app
        .request(api_get("/api/v1/posts/?limit=10&offset=10", None))
        .await;
    let page = body_json(response).await;
    assert_eq!(page["results"].as_array().unwrap().len(), 3);
    assert!(page["next"].is_null());

    // Newest first: the first result is the last post created.
    assert_eq!(page["results"][2]["text"], "numbered 0");
}

#[tokio::test]
async fn comments_are_nested_under_their_post() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let other = app.user("Other").await;
    let post = app.post(author.id, None, "commented").await;
    let another = app.post(author.id, None, "untouched").await;
    let author_token = app.api_token(author.id);
    let other_token = app.api_token(other.id);

    // Anonymous comment creation is rejected.
    let response = app
        .request(json_request(
            Method::POST,
            &format!("/api/v1/posts/{}/comments/", post.id),
            None,
            json!({ "text": "anon" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The parent comes from the path; the body cannot choose another post.
    let response = app
        .request(json_request(
            Method::POST,
            &format!("/api/v1/posts/{}/comments/", post.id),
            Some(&other_token),
            json!({ "text": "Тестовый комментарий", "post": another.id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment = body_json(response).await;
    assert_eq!(comment["post"], post.id);
    assert_eq!(comment["author"], "Other");
    let comment_id = comment["id"].as_i64().unwrap();

    // Visible in the list, absent from the other post's list.
    let listed = body_json(
        app.request(api_get(&format!("/api/v1/posts/{}/comments/", post.id), None)).await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let empty = body_json(
        app.request(api_get(&format!("/api/v1/posts/{}/comments/", another.id), None)).await,
    )
    .await;
    assert!(empty.as_array().unwrap().is_empty());

    // Addressing the comment under the wrong post is a 404.
    let response = app
        .request(api_get(
            &format!("/api/v1/posts/{}/comments/{comment_id}/", another.id),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Only the comment's author may edit or delete it.
    let response = app
        .request(json_request(
            Method::PATCH,
            &format!("/api/v1/posts/{}/comments/{comment_id}/", post.id),
            Some(&author_token),
            json!({ "text": "hijacked" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(json_request(
            Method::DELETE,
            &format!("/api/v1/posts/{}/comments/{comment_id}/", post.id),
            Some(&other_token),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn comments_on_unknown_posts_are_404() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let token = app.api_token(author.id);

    let response = app.request(api_get("/api/v1/posts/999/comments/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/posts/999/comments/",
            Some(&token),
            json!({ "text": "into the void" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn groups_are_read_only_listings() {
    let app = TestApp::spawn().await;
    let group = app.group("Rust notes").await;

    let listed = body_json(app.request(api_get("/api/v1/groups/", None)).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["slug"], "rust-notes");

    let response = app
        .request(api_get(&format!("/api/v1/groups/{}/", group.id), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Rust notes");

    let response = app.request(api_get("/api/v1/groups/999/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_api_routes_answer_json_404() {
    let app = TestApp::spawn().await;
    let response = app.request(api_get("/api/v1/unexisting/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Not found.");
}
