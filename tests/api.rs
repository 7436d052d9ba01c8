//! End-to-end API tests: full router, real middleware, in-memory state.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rosterd::app::{build_router, AppState};
use rosterd::config::{JwtSettings, SecurityConfig};
use rosterd::credentials::CredentialDirectory;
use rosterd::employee::{EmployeeService, InMemoryEmployeeStore};
use rosterd::provider::TokenProvider;

const TEST_SIGNING_KEY: &str = "integration-signing-key-0123456789abcdefghijklmn";

fn test_app() -> Router {
    let settings = JwtSettings {
        secret: TEST_SIGNING_KEY.to_string(),
        access_ttl: Duration::from_secs(3600),
        refresh_ttl: Duration::from_secs(86400),
    };
    let provider = TokenProvider::new(&settings);

    // Low bcrypt cost keeps the suite fast.
    let mut directory = CredentialDirectory::with_cost(4).unwrap();
    directory.register("admin", "password", "USER").unwrap();

    let employees = EmployeeService::new(InMemoryEmployeeStore::new());
    let state = AppState::from_parts(provider, directory, employees);

    build_router(state, &SecurityConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, path: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            &json!({"username": "admin", "password": "password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["accessToken"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

fn employee_body(email: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "department": "Engineering",
        "jobTitle": "Analyst",
        "salary": 90000.0,
        "dateOfJoining": "2020-01-15"
    })
}

// ============================================================================
// Auth flow
// ============================================================================

#[tokio::test]
async fn login_returns_bearer_token_pair() {
    let app = test_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"username": "admin", "password": "password"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");
    let access = body["accessToken"].as_str().unwrap();
    let refresh = body["refreshToken"].as_str().unwrap();
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    // Different token_type claims guarantee distinct strings.
    assert_ne!(access, refresh);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = test_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn login_with_unknown_user_matches_wrong_password_response() {
    let app = test_app();
    let (s1, b1) = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"username": "nobody", "password": "password"}),
        ),
    )
    .await;
    let (s2, b2) = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;

    // Account enumeration is not possible from the response.
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s1, s2);
    assert_eq!(b1, b2);
}

#[tokio::test]
async fn login_with_blank_username_is_400() {
    let app = test_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"username": "  ", "password": "password"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "username");
}

#[tokio::test]
async fn refresh_issues_a_new_valid_pair() {
    let app = test_app();
    let (_, refresh_token) = login(&app).await;

    let (status, body) = send(
        &app,
        post_json("/api/auth/refresh", &json!({"refreshToken": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");

    // The new access token works against a protected route.
    let new_access = body["accessToken"].as_str().unwrap();
    let (status, _) = send(&app, authed("GET", "/api/employees", new_access, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_an_access_token() {
    let app = test_app();
    let (access_token, _) = login(&app).await;

    let (status, _) = send(
        &app,
        post_json("/api/auth/refresh", &json!({"refreshToken": access_token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rejects_garbage() {
    let app = test_app();
    let (status, _) = send(
        &app,
        post_json("/api/auth/refresh", &json!({"refreshToken": "not-a-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Authentication filter behavior
// ============================================================================

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let app = test_app();
    let request = Request::builder()
        .uri("/api/employees")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn protected_route_with_malformed_header_is_401() {
    let app = test_app();
    for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer ", "bearer abc"] {
        let request = Request::builder()
            .uri("/api/employees")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", value);
    }
}

#[tokio::test]
async fn refresh_token_cannot_call_protected_routes() {
    let app = test_app();
    let (_, refresh_token) = login(&app).await;

    let (status, _) = send(&app, authed("GET", "/api/employees", &refresh_token, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_key_is_rejected() {
    let app = test_app();
    let foreign = TokenProvider::new(&JwtSettings {
        secret: "another-signing-key-entirely-0123456789abcdef".to_string(),
        access_ttl: Duration::from_secs(3600),
        refresh_ttl: Duration::from_secs(86400),
    });
    let pair = foreign.issue_pair("admin").unwrap();

    let (status, _) = send(
        &app,
        authed("GET", "/api/employees", &pair.access_token, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn exempt_routes_need_no_token() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = send(
        &app,
        Request::builder().uri("/api/docs").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Employee CRUD
// ============================================================================

#[tokio::test]
async fn employee_crud_round_trip() {
    let app = test_app();
    let (token, _) = login(&app).await;

    // Create
    let (status, created) = send(
        &app,
        authed(
            "POST",
            "/api/employees",
            &token,
            Some(&employee_body("Ada@Example.com")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "ada@example.com");
    let id = created["id"].as_str().unwrap().to_string();

    // Read back
    let (status, fetched) = send(
        &app,
        authed("GET", &format!("/api/employees/{}", id), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // List contains it
    let (status, list) = send(&app, authed("GET", "/api/employees", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Update
    let mut updated_body = employee_body("ada@example.com");
    updated_body["jobTitle"] = json!("Senior Analyst");
    let (status, updated) = send(
        &app,
        authed(
            "PUT",
            &format!("/api/employees/{}", id),
            &token,
            Some(&updated_body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["jobTitle"], "Senior Analyst");
    assert_eq!(updated["id"], id.as_str());

    // Delete
    let (status, body) = send(
        &app,
        authed("DELETE", &format!("/api/employees/{}", id), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    // Gone
    let (status, _) = send(
        &app,
        authed("GET", &format!("/api/employees/{}", id), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_sets_location_header() {
    let app = test_app();
    let (token, _) = login(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/employees",
            &token,
            Some(&employee_body("ada@example.com")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/api/employees/"));
}

#[tokio::test]
async fn duplicate_email_is_409() {
    let app = test_app();
    let (token, _) = login(&app).await;

    let (status, _) = send(
        &app,
        authed(
            "POST",
            "/api/employees",
            &token,
            Some(&employee_body("ada@example.com")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same address, different case.
    let (status, body) = send(
        &app,
        authed(
            "POST",
            "/api/employees",
            &token,
            Some(&employee_body("ADA@EXAMPLE.COM")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn invalid_employee_payload_is_400() {
    let app = test_app();
    let (token, _) = login(&app).await;

    let mut body = employee_body("ada@example.com");
    body["salary"] = json!(-5.0);

    let (status, response) = send(
        &app,
        authed("POST", "/api/employees", &token, Some(&body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "salary");
}

#[tokio::test]
async fn unknown_employee_id_is_404() {
    let app = test_app();
    let (token, _) = login(&app).await;

    let (status, body) = send(
        &app,
        authed("GET", "/api/employees/does-not-exist", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(
        &app,
        authed("DELETE", "/api/employees/does-not-exist", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
