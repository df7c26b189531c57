//! Integration tests for the challenge board.

use biohub_store::Store;
use http::StatusCode;
use serde_json::{Value, json};

use crate::common::{LONG_DESCRIPTION, TestHarness};

fn draft(title: &str) -> Value {
    json!({
        "title": title,
        "description": LONG_DESCRIPTION,
        "disease_focus": "Tuberculosis",
        "priority_level": "critical",
        "expected_outcome": "Open dataset of resistance markers",
        "reward_amount": "2500",
        "deadline": "2026-12-31",
        "tags": "tb, amr"
    })
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let harness = TestHarness::new();
    for n in 1..=10 {
        harness
            .seed_challenge("ada", &format!("Challenge {n}"), &[])
            .await;
    }

    let first = harness.get("/api/challenges", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 9);
    assert_eq!(first.body["items"][0]["title"], "Challenge 10");
    assert_eq!(first.body["total_items"], 10);
    assert_eq!(first.body["total_pages"], 2);

    let second = harness.get("/api/challenges?page=2", None).await;
    assert_eq!(second.body["page"], 2);
    assert_eq!(second.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(second.body["items"][0]["title"], "Challenge 1");
}

#[tokio::test]
async fn test_list_searches_titles_and_tags() {
    let harness = TestHarness::new();
    harness
        .seed_challenge("ada", "Malaria vaccine", &["vaccines"])
        .await;
    harness
        .seed_challenge("ada", "Protein folding", &["structure"])
        .await;

    let by_title = harness.get("/api/challenges?q=MALARIA", None).await;
    assert_eq!(by_title.body["total_items"], 1);
    assert_eq!(by_title.body["items"][0]["title"], "Malaria vaccine");

    let by_tag = harness.get("/api/challenges?q=struct", None).await;
    assert_eq!(by_tag.body["items"][0]["title"], "Protein folding");
}

#[tokio::test]
async fn test_list_filters_by_difficulty() {
    let harness = TestHarness::new();
    harness.seed_challenge("ada", "Unrated", &[]).await;
    let rated = harness.seed_challenge("ada", "Rated", &[]).await;
    harness
        .put(
            &format!("/api/challenges/{}", rated.id),
            Some("ada"),
            json!({ "title": "Rated", "description": "Hard one", "difficulty": "advanced" }),
        )
        .await;

    let advanced = harness
        .get("/api/challenges?difficulty=advanced", None)
        .await;
    assert_eq!(advanced.body["total_items"], 1);
    assert_eq!(advanced.body["items"][0]["title"], "Rated");

    let all = harness.get("/api/challenges?difficulty=", None).await;
    assert_eq!(all.body["total_items"], 2);
}

#[tokio::test]
async fn test_list_rejects_unknown_difficulty() {
    let harness = TestHarness::new();
    let reply = harness
        .get("/api/challenges?difficulty=legendary", None)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_show_includes_creator() {
    let harness = TestHarness::new();
    harness.seed_profile("ada", "ada", "Ada Lovelace").await;
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .get(&format!("/api/challenges/{}", challenge.id), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["title"], "Malaria vaccine");
    assert_eq!(reply.body["creator"]["full_name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_show_unknown_is_not_found() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/challenges/missing", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "Challenge not found");
}

#[tokio::test]
async fn test_create_challenge() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/challenges", Some("ada"), draft("  TB resistance map "))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["title"], "TB resistance map");
    assert_eq!(reply.body["priority_level"], "critical");
    assert_eq!(reply.body["reward_amount"], 2500.0);
    assert_eq!(reply.body["deadline"], "2026-12-31");
    assert_eq!(reply.body["tags"], json!(["tb", "amr"]));
    assert_eq!(reply.body["creator_id"], "ada");
}

#[tokio::test]
async fn test_create_challenge_requires_sign_in() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/challenges", None, draft("TB resistance map"))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_challenge_reports_every_bad_field() {
    let harness = TestHarness::new();
    let reply = harness
        .post(
            "/api/challenges",
            Some("ada"),
            json!({ "title": "x".repeat(101), "description": "too short", "reward_amount": -5 }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = &reply.body["fields"];
    assert_eq!(fields["title"], "Title must be less than 100 characters");
    assert_eq!(fields["description"], "Description must be at least 50 characters");
    assert_eq!(fields["disease_focus"], "Disease focus is required");
    assert_eq!(fields["expected_outcome"], "Expected outcome is required");
    assert_eq!(fields["reward_amount"], "Reward must be a positive number");
    assert!(harness.store.list_challenges(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_challenge_rejects_non_json_body() {
    let harness = TestHarness::new();
    let request = http::Request::builder()
        .method(http::Method::POST)
        .uri("/api/challenges")
        .header(http::header::AUTHORIZATION, "Bearer token-ada")
        .body(axum::body::Body::from("title=hello"))
        .unwrap();
    let reply = harness.send_request(request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_by_creator() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .put(
            &format!("/api/challenges/{}", challenge.id),
            Some("ada"),
            json!({
                "title": "Malaria vaccine v2",
                "description": "Updated scope",
                "difficulty": "intermediate",
                "tags": "malaria, vaccines"
            }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["title"], "Malaria vaccine v2");
    assert_eq!(reply.body["difficulty"], "intermediate");
    assert_eq!(reply.body["tags"], json!(["malaria", "vaccines"]));
    assert!(reply.body["updated_at"].is_string());
}

#[tokio::test]
async fn test_update_by_someone_else_is_forbidden() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .put(
            &format!("/api/challenges/{}", challenge.id),
            Some("grace"),
            json!({ "title": "Hijacked", "description": "Mine now" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let stored = harness
        .store
        .get_challenge(&challenge.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Malaria vaccine");
}

#[tokio::test]
async fn test_update_with_blank_title_is_invalid() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .put(
            &format!("/api/challenges/{}", challenge.id),
            Some("ada"),
            json!({ "title": "", "description": "Still here" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["fields"]["title"], "Title is required");
}

#[tokio::test]
async fn test_delete_without_sign_in_is_unauthorized() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .delete(&format!("/api/challenges/{}", challenge.id), None)
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "Unauthorized");
}

#[tokio::test]
async fn test_delete_by_someone_else_is_forbidden() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;

    let reply = harness
        .delete(&format!("/api/challenges/{}", challenge.id), Some("grace"))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.error(), "Unauthorized");
}

#[tokio::test]
async fn test_delete_by_creator() {
    let harness = TestHarness::new();
    let challenge = harness.seed_challenge("ada", "Malaria vaccine", &[]).await;
    let uri = format!("/api/challenges/{}", challenge.id);

    let reply = harness.delete(&uri, Some("ada")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "success": true }));

    let gone = harness.get(&uri, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
