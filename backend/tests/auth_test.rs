//! Every API route rejects requests without a valid bearer token

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_routes_require_auth() {
    let app = common::TestApp::offline();

    for path in [
        "/api/v1/drift/insights",
        "/api/v1/drift/export",
        "/api/v1/plan",
        "/api/v1/plan/restore-check",
        "/api/v1/logs",
        "/api/v1/nudges",
    ] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require auth", path);
        assert!(body.contains("UNAUTHORIZED"));
    }

    let (status, _) = app.post("/api/v1/drift/analyze", "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = common::TestApp::offline();

    let (status, _) = app.get_auth("/api/v1/drift/insights", "not-a-jwt").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
