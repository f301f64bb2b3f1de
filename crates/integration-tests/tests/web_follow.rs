//! Follow graph through the web UI: toggles, the subscription feed and its
//! exclusions.

use axum::http::StatusCode;

use integration_tests::*;
use quill_core::traits::FollowRepo;

#[tokio::test]
async fn follow_toggle_is_idempotent_on_intent() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let subscriber = app.user("Subscriber").await;
    let cookie = app.login("Subscriber").await;

    let response = app
        .request(get_with_cookie("/profile/Author/follow/", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/Author/");
    assert!(FollowRepo::exists(app.store.as_ref(), subscriber.id, author.id).await.unwrap());

    // Following again neither errors nor duplicates.
    let response = app
        .request(get_with_cookie("/profile/Author/follow/", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let edges = FollowRepo::list_for_user(app.store.as_ref(), subscriber.id, None).await.unwrap();
    assert_eq!(edges.len(), 1);
}

#[tokio::test]
async fn unfollow_removes_only_the_owners_edge() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let subscriber = app.user("Subscriber").await;
    let bystander = app.user("Bystander").await;
    FollowRepo::insert(app.store.as_ref(), subscriber.id, author.id).await.unwrap();

    // A different authenticated user unfollowing touches their own (absent)
    // edge, not the subscriber's.
    let cookie = app.login("Bystander").await;
    let response = app
        .request(get_with_cookie("/profile/Author/unfollow/", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(FollowRepo::exists(app.store.as_ref(), subscriber.id, author.id).await.unwrap());
    assert!(!FollowRepo::exists(app.store.as_ref(), bystander.id, author.id).await.unwrap());

    let cookie = app.login("Subscriber").await;
    let response = app
        .request(get_with_cookie("/profile/Author/unfollow/", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(!FollowRepo::exists(app.store.as_ref(), subscriber.id, author.id).await.unwrap());
}

#[tokio::test]
async fn self_follow_through_the_ui_is_a_no_op() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let cookie = app.login("Author").await;

    let response = app
        .request(get_with_cookie("/profile/Author/follow/", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(!FollowRepo::exists(app.store.as_ref(), author.id, author.id).await.unwrap());
}

#[tokio::test]
async fn subscription_feed_shows_followed_authors_newest_first() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    let stranger = app.user("Stranger").await;
    app.user("Subscriber").await;

    let cookie = app.login("Subscriber").await;
    app.request(get_with_cookie("/profile/Author/follow/", &cookie)).await;

    app.post(author.id, None, "followed first").await;
    app.post(stranger.id, None, "stranger noise").await;
    app.post(author.id, None, "followed second").await;

    let html = body_string(app.request(get_with_cookie("/follow/", &cookie)).await).await;
    assert!(html.contains("followed first"));
    assert!(html.contains("followed second"));
    assert!(!html.contains("stranger noise"));
    // Newest first.
    let newer = html.find("followed second").unwrap();
    let older = html.find("followed first").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn subscription_feed_is_empty_not_an_error_for_loners() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    app.post(author.id, None, "somebody's post").await;
    app.user("Reader").await;

    let cookie = app.login("Reader").await;
    let response = app.request(get_with_cookie("/follow/", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(!html.contains("somebody's post"));
    assert!(html.contains("Nothing here yet"));
}

#[tokio::test]
async fn profile_shows_follow_affordance_and_post_count() {
    let app = TestApp::spawn().await;
    let author = app.user("Author").await;
    app.post(author.id, None, "one").await;
    app.post(author.id, None, "two").await;
    app.user("Subscriber").await;

    let cookie = app.login("Subscriber").await;
    let html = body_string(app.request(get_with_cookie("/profile/Author/", &cookie)).await).await;
    assert!(html.contains("2 post(s)"));
    assert!(html.contains("/profile/Author/follow/"));

    app.request(get_with_cookie("/profile/Author/follow/", &cookie)).await;
    let html = body_string(app.request(get_with_cookie("/profile/Author/", &cookie)).await).await;
    assert!(html.contains("/profile/Author/unfollow/"));
}
