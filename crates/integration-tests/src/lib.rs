//! End-to-end test harness: the full router over an in-memory store, a
//! throwaway media directory and a session cookie helper, driven through
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quill_auth_simple::{JwtTokenService, SimpleAuthenticator};
use quill_core::cache::MemoryPageCache;
use quill_core::models::{Group, NewPost, NewUser, PostEntry, User};
use quill_core::traits::{Authenticator, PostRepo, TokenService, UserRepo};
use quill_db_sqlite::SqliteStore;
use quill_http::mailer::LogMailer;
use quill_http::AppState;
use quill_storage_local::LocalMediaStore;

/// Shared fixture password for every test account.
pub const PASSWORD: &str = "correct horse battery staple";

/// 1x2 pixel GIF, the smallest valid image payload.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<SqliteStore>,
    pub cache: Arc<MemoryPageCache>,
    pub auth: Arc<SimpleAuthenticator>,
    pub tokens: Arc<JwtTokenService>,
    pub media_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let media_dir = tempfile::tempdir().unwrap();
        let media = Arc::new(LocalMediaStore::new(
            media_dir.path().to_path_buf(),
            "/media".to_string(),
        ));
        let auth = Arc::new(SimpleAuthenticator::new(store.clone()));
        let tokens = Arc::new(JwtTokenService::new("test-secret", 15, 15));
        let cache = Arc::new(MemoryPageCache::new());

        let state = AppState {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
            auth: auth.clone(),
            tokens: tokens.clone(),
            media,
            mailer: Arc::new(LogMailer),
            cache: cache.clone(),
            index_cache_ttl: Duration::from_secs(20),
        };

        let router = quill_http::router(state, media_dir.path());
        Self { router, store, cache, auth, tokens, media_dir }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn user(&self, username: &str) -> User {
        let hash = self.auth.hash_password(PASSWORD).unwrap();
        UserRepo::insert(
            self.store.as_ref(),
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: hash,
                first_name: None,
                last_name: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn group(&self, title: &str) -> Group {
        quill_core::groups::create(self.store.as_ref(), title, None)
            .await
            .unwrap()
    }

    pub async fn post(&self, author_id: i64, group_id: Option<i64>, text: &str) -> PostEntry {
        PostRepo::insert(
            self.store.as_ref(),
            NewPost { author_id, text: text.to_string(), image: None, group_id },
        )
        .await
        .unwrap()
    }

    /// Logs in through the real login page and returns the session cookie.
    pub async fn login(&self, username: &str) -> String {
        let body = format!(
            "username={}&password={}&next=/",
            urlencode(username),
            urlencode(PASSWORD)
        );
        let response = self.request(post_form("/auth/login/", &body)).await;
        assert_eq!(response.status(), StatusCode::FOUND, "login should redirect");
        cookie_from(&response)
    }

    pub fn api_token(&self, user_id: i64) -> String {
        self.tokens.issue_pair(user_id).unwrap().access
    }
}

pub fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            b' ' => "+".to_string(),
            other => format!("%{other:02X}"),
        })
        .collect()
}

pub fn cookie_from(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_form_with_cookie(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "----quill-test-boundary";

/// Builds a browser-style `multipart/form-data` POST.
pub fn post_multipart(
    uri: &str,
    cookie: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn api_get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response should carry a Location header")
        .to_str()
        .unwrap()
}
