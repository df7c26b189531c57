//! Integration tests for profiles and the dashboard.

use biohub_core::model::{ColabMember, MemberRole, MemberStatus};
use biohub_store::Store;
use http::StatusCode;
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_new_user_gets_default_profile() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/profile", Some("ada")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["id"], "ada");
    assert_eq!(reply.body["username"], "ada");
    assert_eq!(reply.body["is_new"], true);
    assert!(harness.store.get_profile("ada").await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/profile", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "Authentication required");
}

#[tokio::test]
async fn test_save_profile_uses_caller_id() {
    let harness = TestHarness::new();
    let reply = harness
        .put(
            "/api/profile",
            Some("ada"),
            json!({
                "id": "someone-else",
                "username": "  countess ",
                "full_name": "Ada Lovelace",
                "interests": ["computing", " ", "poetry"],
            }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["id"], "ada");
    assert_eq!(reply.body["username"], "countess");
    assert_eq!(reply.body["interests"], json!(["computing", "poetry"]));
    assert_eq!(reply.body["is_new"], false);

    assert!(harness.store.get_profile("someone-else").await.unwrap().is_none());
    let stored = harness.store.get_profile("ada").await.unwrap().unwrap();
    assert_eq!(stored.full_name, "Ada Lovelace");

    let reloaded = harness.get("/api/profile", Some("ada")).await;
    assert_eq!(reloaded.body["username"], "countess");
    assert_eq!(reloaded.body["is_new"], false);
}

#[tokio::test]
async fn test_save_profile_requires_username() {
    let harness = TestHarness::new();
    let reply = harness
        .put("/api/profile", Some("ada"), json!({ "full_name": "Ada" }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["fields"]["username"], "Username is required");
}

#[tokio::test]
async fn test_dashboard_collects_everything() {
    let harness = TestHarness::new();
    harness.seed_profile("ada", "ada", "Ada Lovelace").await;
    let mine = harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;
    harness
        .store
        .add_member(&ColabMember {
            colab_id: mine.id.clone(),
            user_id: "ada".into(),
            role: MemberRole::Owner,
            status: MemberStatus::Accepted,
        })
        .await
        .unwrap();
    for n in 0..8 {
        harness
            .seed_colab("grace", &format!("Open {n}"), &format!("open-{n}"))
            .await;
        harness
            .seed_challenge("grace", &format!("Challenge {n}"), &[])
            .await;
    }
    harness
        .post("/api/ai/ask", Some("ada"), json!({ "prompt": "Hi" }))
        .await;

    let reply = harness.get("/api/dashboard", Some("ada")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["profile"]["username"], "ada");
    assert_eq!(reply.body["colabs"].as_array().unwrap().len(), 1);
    assert_eq!(reply.body["colabs"][0]["slug"], "kinase-atlas");
    assert_eq!(reply.body["open_colabs"].as_array().unwrap().len(), 6);
    assert_eq!(reply.body["challenges"].as_array().unwrap().len(), 6);
    assert_eq!(reply.body["quota"], json!({ "used": 1, "limit": 5, "remaining": 4 }));
}

#[tokio::test]
async fn test_dashboard_for_new_user_is_empty() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/dashboard", Some("newbie")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["profile"].is_null());
    assert_eq!(reply.body["colabs"], json!([]));
    assert_eq!(reply.body["quota"]["remaining"], 5);
}
