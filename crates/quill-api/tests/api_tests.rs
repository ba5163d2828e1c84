//! API Integration Tests
//!
//! Every test drives the full router over in-memory stores.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use quill_api::{create_router_for_testing, create_test_app};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut request = create_json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Sign up and sign in, returning (access_token, refresh_token)
async fn sign_in(app: &Router, email: &str) -> (String, String) {
    let credentials = json!({"email": email, "password": "correct-horse"});

    let response = send(
        app,
        create_json_request("POST", "/auth/signup", Some(credentials.clone())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        create_json_request("POST", "/auth/signin", Some(credentials)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    (
        json["access_token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> String {
    let response = send(app, authed_request("POST", uri, token, Some(body))).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

fn author_body(name: &str) -> Value {
    json!({
        "avatar": "https://cdn.example.com/a.png",
        "name": name,
        "designation": "Editor",
        "linkedin": "https://linkedin.com/in/someone"
    })
}

/// Creates a domain, category and author; returns their ids
async fn blog_fixtures(app: &Router, token: &str) -> (String, String, String) {
    let domain_id = create(
        app,
        token,
        "/domains",
        json!({"name": "Tech", "url": "https://tech.example.com"}),
    )
    .await;
    let category_id = create(
        app,
        token,
        "/blog-categories",
        json!({"name": "Rust", "domainId": domain_id}),
    )
    .await;
    let author_id = create(app, token, "/authors", author_body("Ferris")).await;
    (domain_id, category_id, author_id)
}

fn blog_body(title: &str, content: &str, ids: &(String, String, String)) -> Value {
    json!({
        "title": title,
        "publishDate": "2024-05-01T09:00:00Z",
        "content": content,
        "introduction": "intro",
        "image": "https://cdn.example.com/cover.png",
        "tags": ["rust"],
        "domainId": ids.0,
        "blogCategoryId": ids.1,
        "authorId": ids.2
    })
}

// =============================================================================
// Health & Docs
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/blogs/lookups"].is_object());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let app = create_router_for_testing();
    let credentials = json!({"email": "writer@example.com", "password": "correct-horse"});

    // sign-up
    let response = send(
        &app,
        create_json_request("POST", "/auth/signup", Some(credentials.clone())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = body_json(response).await;
    assert_eq!(account["email"], "writer@example.com");
    assert!(account.get("passwordHash").is_none());
    assert!(account.get("password_hash").is_none());

    // sign-in
    let response = send(
        &app,
        create_json_request("POST", "/auth/signin", Some(credentials)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    let tokens = body_json(response).await;
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(access, refresh);

    // refresh rotates the pair
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({"refresh_token": refresh})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    let new_access = rotated["access_token"].as_str().unwrap().to_string();
    let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_access, access);
    assert_ne!(new_refresh, refresh);

    // the rotated-out token no longer works
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({"refresh_token": refresh})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // logout clears the cookie and revokes the current refresh token
    let response = send(
        &app,
        authed_request(
            "POST",
            "/auth/logout",
            &new_access,
            Some(json!({"email": "writer@example.com"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).contains("Max-Age=0"));
    assert_eq!(body_json(response).await["message"], "Logged out successfully");

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({"refresh_token": new_refresh})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_from_cookie() {
    let app = create_router_for_testing();
    let (_, refresh) = sign_in(&app, "cookie@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh")
        .header(header::COOKIE, format!("theme=dark; refresh_token={refresh}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("refresh_token="));
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let app = create_router_for_testing();

    let response = send(&app, create_json_request("POST", "/auth/refresh", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_rejected_as_refresh_token() {
    let app = create_router_for_testing();
    let (access, _) = sign_in(&app, "swap@example.com").await;

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({"refresh_token": access})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signin_failures_are_indistinguishable() {
    let app = create_router_for_testing();
    sign_in(&app, "known@example.com").await;

    let unknown = send(
        &app,
        create_json_request(
            "POST",
            "/auth/signin",
            Some(json!({"email": "nobody@example.com", "password": "correct-horse"})),
        ),
    )
    .await;
    let wrong = send(
        &app,
        create_json_request(
            "POST",
            "/auth/signin",
            Some(json!({"email": "known@example.com", "password": "wrong-password"})),
        ),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn test_signup_validation_and_duplicates() {
    let app = create_router_for_testing();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/signup",
            Some(json!({"email": "not-an-email", "password": "short"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["details"].as_array().unwrap().len(), 2);

    sign_in(&app, "dup@example.com").await;
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/signup",
            Some(json!({"email": "dup@example.com", "password": "another-password"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_requires_matching_identity() {
    let app = create_router_for_testing();
    let (access, _) = sign_in(&app, "first@example.com").await;
    sign_in(&app, "second@example.com").await;

    let response = send(
        &app,
        authed_request(
            "POST",
            "/auth/logout",
            &access,
            Some(json!({"email": "second@example.com"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // logout itself is protected
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/auth/logout",
            Some(json!({"email": "first@example.com"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Authorization gate
// =============================================================================

#[tokio::test]
async fn test_writes_require_bearer_token() {
    let app = create_router_for_testing();

    for (method, uri) in [
        ("POST", "/domains"),
        ("PUT", "/authors/00000000-0000-0000-0000-000000000001"),
        ("DELETE", "/blogs/00000000-0000-0000-0000-000000000001"),
        ("POST", "/blog-categories"),
    ] {
        let response = send(&app, create_json_request(method, uri, Some(json!({})))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    let response = send(
        &app,
        authed_request("POST", "/domains", "not-a-jwt", Some(json!({}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reads_are_public() {
    let app = create_router_for_testing();

    for uri in ["/domains", "/authors", "/blog-categories", "/blogs", "/blogs/lookups"] {
        let response = send(&app, create_json_request("GET", uri, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let json = body_json(response).await;
        assert_eq!(json["count"], 0);
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn test_domain_crud() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    let id = create(
        &app,
        &token,
        "/domains",
        json!({"name": "Tech", "url": "https://tech.example.com"}),
    )
    .await;

    let response = send(&app, create_json_request("GET", &format!("/domains/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let domain = body_json(response).await;
    assert_eq!(domain["name"], "Tech");
    assert_eq!(domain["isActive"], true);

    // partial update keeps the url
    let response = send(
        &app,
        authed_request(
            "PUT",
            &format!("/domains/{id}"),
            &token,
            Some(json!({"name": "Technology"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);

    let response = send(&app, create_json_request("GET", &format!("/domains/{id}"), None)).await;
    let domain = body_json(response).await;
    assert_eq!(domain["name"], "Technology");
    assert_eq!(domain["url"], "https://tech.example.com");

    // duplicate url
    let response = send(
        &app,
        authed_request(
            "POST",
            "/domains",
            &token,
            Some(json!({"name": "Copy", "url": "https://tech.example.com"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        authed_request("DELETE", &format!("/domains/{id}"), &token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, create_json_request("GET", &format!("/domains/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        authed_request("DELETE", &format!("/domains/{id}"), &token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    let response = send(
        &app,
        authed_request(
            "PUT",
            "/authors/00000000-0000-0000-0000-000000000001",
            &token,
            Some(json!({"name": "Ghost"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_is_json_bad_request() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    let response = send(&app, create_json_request("GET", "/domains/not-a-uuid", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = send(&app, authed_request("DELETE", "/blogs/123", &token, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_author_pagination() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    for i in 0..15 {
        create(&app, &token, "/authors", author_body(&format!("Author {i}"))).await;
    }

    let response = send(
        &app,
        create_json_request("GET", "/authors?pageIndex=2&pageSize=10", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["count"], 15);
    assert_eq!(page["data"].as_array().unwrap().len(), 5);

    // defaults: first page of 10
    let response = send(&app, create_json_request("GET", "/authors", None)).await;
    let page = body_json(response).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 10);

    let response = send(
        &app,
        create_json_request("GET", "/authors?pageSize=101", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        create_json_request("GET", "/authors?pageIndex=0", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validation_rejected_before_store() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    let response = send(
        &app,
        authed_request(
            "POST",
            "/authors",
            &token,
            Some(json!({"avatar": "", "name": "", "designation": "x", "linkedin": "x"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, create_json_request("GET", "/authors", None)).await;
    assert_eq!(body_json(response).await["count"], 0);

    // malformed JSON
    let request = Request::builder()
        .method("POST")
        .uri("/authors")
        .header("Content-Type", "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_filter_by_domain() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;

    let tech = create(
        &app,
        &token,
        "/domains",
        json!({"name": "Tech", "url": "https://tech.example.com"}),
    )
    .await;
    let food = create(
        &app,
        &token,
        "/domains",
        json!({"name": "Food", "url": "https://food.example.com"}),
    )
    .await;
    create(
        &app,
        &token,
        "/blog-categories",
        json!({"name": "Rust", "domainId": tech}),
    )
    .await;
    create(
        &app,
        &token,
        "/blog-categories",
        json!({"name": "Baking", "domainId": food}),
    )
    .await;

    let response = send(
        &app,
        create_json_request("GET", &format!("/blog-categories?domainId={food}"), None),
    )
    .await;
    let page = body_json(response).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["name"], "Baking");
}

#[tokio::test]
async fn test_blog_keyword_filter_and_lookups() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;
    let ids = blog_fixtures(&app, &token).await;

    create(
        &app,
        &token,
        "/blogs",
        blog_body("Fearless Concurrency", "threads and channels", &ids),
    )
    .await;
    create(
        &app,
        &token,
        "/blogs",
        blog_body("Error handling", "Result and the ? operator, no CONCURRENCY", &ids),
    )
    .await;
    create(&app, &token, "/blogs", blog_body("Macros", "declarative", &ids)).await;

    // title or content, case-insensitive
    let response = send(
        &app,
        create_json_request("GET", "/blogs?keyword=concurrency", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["count"], 2);

    // lookups match titles only and omit content
    let response = send(
        &app,
        create_json_request("GET", "/blogs/lookups?keyword=CONCURRENCY", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["title"], "Fearless Concurrency");
    assert!(page["data"][0].get("content").is_none());

    let response = send(
        &app,
        create_json_request(
            "GET",
            &format!("/blogs?blogCategoryId={}&isFeatured=false", ids.1),
            None,
        ),
    )
    .await;
    assert_eq!(body_json(response).await["count"], 3);
}

#[tokio::test]
async fn test_blog_update_and_delete() {
    let app = create_router_for_testing();
    let (token, _) = sign_in(&app, "editor@example.com").await;
    let ids = blog_fixtures(&app, &token).await;
    let id = create(&app, &token, "/blogs", blog_body("Draft", "body", &ids)).await;

    let response = send(
        &app,
        authed_request(
            "PUT",
            &format!("/blogs/{id}"),
            &token,
            Some(json!({"isFeatured": true, "tags": ["rust", "async"]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, create_json_request("GET", "/blogs?isFeatured=true", None)).await;
    let page = body_json(response).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["title"], "Draft");
    assert_eq!(page["data"][0]["tags"], json!(["rust", "async"]));

    let response = send(
        &app,
        authed_request("DELETE", &format!("/blogs/{id}"), &token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);
}

// =============================================================================
// Uploads
// =============================================================================

fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "quill-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload/file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_image() {
    let (app, storage) = create_test_app();

    let response = send(
        &app,
        multipart_request("image", "cover.png", "image/png", b"\x89PNG\r\n\x1a\n"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], 1);
    let url = json["file"]["url"].as_str().unwrap();
    assert!(url.ends_with("-cover.png"));

    let key = url.split_once("/uploads/").map(|(_, rest)| rest).unwrap();
    let stored = storage.get(&format!("uploads/{key}")).await.unwrap();
    assert_eq!(stored.content_type, "image/png");
}

#[tokio::test]
async fn test_upload_rejects_non_images_and_missing_field() {
    let (app, storage) = create_test_app();

    let response = send(
        &app,
        multipart_request("image", "notes.txt", "text/plain", b"hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        multipart_request("file", "cover.png", "image/png", b"png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(storage.len().await, 0);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = create_router_for_testing();
    let data = vec![0u8; 5 * 1024 * 1024 + 1];

    let response = send(&app, multipart_request("image", "big.png", "image/png", &data)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_url_rejects_bad_scheme() {
    let app = create_router_for_testing();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/upload/fetchUrl",
            Some(json!({"url": "file:///etc/passwd"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_url_stores_remote_file() {
    let remote = Router::new()
        .route(
            "/cover.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], b"\x89PNG".to_vec()) }),
        )
        .route(
            "/missing.png",
            get(|| async { StatusCode::NOT_FOUND }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, remote).await });

    let (app, storage) = create_test_app();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/upload/fetchUrl",
            Some(json!({"url": format!("http://{addr}/cover.png")})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let url = body_json(response).await["file"]["url"]
        .as_str()
        .unwrap()
        .to_string();
    let key = url.split_once("/uploads/").map(|(_, rest)| rest).unwrap();
    let stored = storage.get(&format!("uploads/{key}")).await.unwrap();
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.body.as_ref(), b"\x89PNG");

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/upload/fetchUrl",
            Some(json!({"url": format!("http://{addr}/missing.png")})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
}
