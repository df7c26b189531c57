//! Integration tests for the auth proxy, the page guard, and health.

use http::StatusCode;
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_health() {
    let harness = TestHarness::new();
    let reply = harness.get("/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
}

#[tokio::test]
async fn test_guard_sends_anonymous_visitor_to_sign_in() {
    let harness = TestHarness::new();
    let reply = harness
        .get("/api/auth/redirect?path=/colab/kinase-atlas", None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "action": "redirect", "location": "/signin?redirectTo=%2Fcolab%2Fkinase-atlas" })
    );
}

#[tokio::test]
async fn test_guard_allows_public_pages() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/auth/redirect?path=/", None).await;
    assert_eq!(reply.body, json!({ "action": "allow" }));
}

#[tokio::test]
async fn test_guard_sends_signed_in_user_away_from_sign_in() {
    let harness = TestHarness::new();

    let back = harness
        .get(
            "/api/auth/redirect?path=/signin&redirectTo=/challenges",
            Some("ada"),
        )
        .await;
    assert_eq!(
        back.body,
        json!({ "action": "redirect", "location": "/challenges" })
    );

    let offsite = harness
        .get(
            "/api/auth/redirect?path=/signup&redirectTo=https://evil.example",
            Some("ada"),
        )
        .await;
    assert_eq!(offsite.body["location"], "/dashboard");

    let protected = harness.get("/api/auth/redirect?path=/dashboard", Some("ada")).await;
    assert_eq!(protected.body, json!({ "action": "allow" }));
}

#[tokio::test]
async fn test_guard_rejects_relative_path() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/auth/redirect?path=dashboard", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_requires_credentials() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/auth/signin", None, json!({ "email": "ada@lab.org" }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "Email and password are required");
}

#[tokio::test]
async fn test_sign_in_without_auth_service() {
    let harness = TestHarness::new();
    let reply = harness
        .post(
            "/api/auth/signin",
            None,
            json!({ "email": "ada@lab.org", "password": "hunter2" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.error(), "Authentication service not configured");
}

#[tokio::test]
async fn test_sign_out_requires_sign_in() {
    let harness = TestHarness::new();
    let reply = harness.post("/api/auth/signout", None, json!({})).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}
