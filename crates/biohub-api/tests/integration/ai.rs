//! Integration tests for the research assistant and literature review.

use std::sync::Arc;

use biohub_ai::MockLlmProvider;
use biohub_core::MONTHLY_PROMPT_LIMIT;
use biohub_core::model::AiPrompt;
use biohub_store::Store;
use http::header::AUTHORIZATION;
use http::{Method, Request, StatusCode};
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_ask_with_malformed_json_is_bad_request() {
    let harness = TestHarness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ai/ask")
        .header(AUTHORIZATION, "Bearer token-ada")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"prompt\": "))
        .unwrap();
    let reply = harness.send_request(request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(!reply.error().is_empty());
    assert!(harness.llm.prompts().await.is_empty());
    assert_eq!(harness.store.prompt_count().await, 0);
}

#[tokio::test]
async fn test_ask_requires_prompt() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/ai/ask", None, json!({ "prompt": "   " }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "Prompt is required");
    assert!(harness.llm.prompts().await.is_empty());
}

#[tokio::test]
async fn test_anonymous_ask_is_answered_but_not_logged() {
    let harness = TestHarness::new();
    let reply = harness
        .post(
            "/api/ai/ask",
            None,
            json!({ "prompt": "How do I design a CRISPR screen?" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "response": "Mock answer" }));
    assert_eq!(harness.store.prompt_count().await, 0);

    let prompts = harness.llm.prompts().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User question: How do I design a CRISPR screen?"));
}

#[tokio::test]
async fn test_signed_in_ask_is_logged() {
    let harness = TestHarness::new();
    let reply = harness
        .post(
            "/api/ai/ask",
            Some("ada"),
            json!({ "prompt": "Which controls for qPCR?" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(harness.store.prompt_count().await, 1);
    assert_eq!(
        harness
            .store
            .count_prompts_since("ada", chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_ask_over_quota_is_refused() {
    let harness = TestHarness::new();
    for n in 0..MONTHLY_PROMPT_LIMIT {
        harness
            .store
            .record_prompt(&AiPrompt {
                user_id: "ada".into(),
                prompt: format!("question {n}"),
                response: "answer".into(),
                model: "mock".into(),
                created_at: None,
            })
            .await
            .unwrap();
    }

    let reply = harness
        .post("/api/ai/ask", Some("ada"), json!({ "prompt": "One more?" }))
        .await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        reply.error(),
        "You have reached your monthly limit of 5 AI prompts. Upgrade to continue."
    );
    assert!(harness.llm.prompts().await.is_empty());

    // Someone else still has their allowance
    let other = harness
        .post("/api/ai/ask", Some("grace"), json!({ "prompt": "Hello?" }))
        .await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_ask_with_bad_token_is_rejected() {
    let harness = TestHarness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ai/ask")
        .header(AUTHORIZATION, "Bearer forged")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(r#"{"prompt":"hi"}"#))
        .unwrap();
    let reply = harness.send_request(request).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ask_when_assistant_fails() {
    let harness = TestHarness::with_llm(Arc::new(MockLlmProvider::failing()));
    let reply = harness
        .post("/api/ai/ask", Some("ada"), json!({ "prompt": "Anyone there?" }))
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "Failed to process your request");
    assert_eq!(harness.store.prompt_count().await, 0);
}

#[tokio::test]
async fn test_literature_review() {
    let harness = TestHarness::with_llm(Arc::new(MockLlmProvider::with_responses([
        "1. Smith et al. 2021 ...",
    ])));
    let reply = harness
        .post(
            "/api/literature-review",
            None,
            json!({ "query": "phage therapy", "colabContext": "antibiotic resistance" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "review": "1. Smith et al. 2021 ..." }));

    let prompts = harness.llm.prompts().await;
    assert!(prompts[0].contains("phage therapy"));
    assert!(prompts[0].contains("antibiotic resistance"));
}

#[tokio::test]
async fn test_literature_review_requires_query() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/literature-review", None, json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "Query is required");
}

#[tokio::test]
async fn test_literature_review_when_assistant_fails() {
    let harness = TestHarness::with_llm(Arc::new(MockLlmProvider::failing()));
    let reply = harness
        .post("/api/literature-review", None, json!({ "query": "phage" }))
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "Failed to generate literature review");
}
