//! Integration tests for the colab page, forking, creation, and workspace.

use biohub_store::Store;
use http::StatusCode;
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_colab_page_counts_each_visit() {
    let harness = TestHarness::new();
    harness.seed_profile("ada", "ada", "Ada Lovelace").await;
    harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;

    let first = harness.get("/api/colab/kinase-atlas", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["name"], "Kinase Atlas");
    assert_eq!(first.body["stats"]["views"], 1);
    assert_eq!(first.body["stats"]["contributors"], 1);
    assert_eq!(first.body["creator"]["name"], "Ada Lovelace");
    assert_eq!(first.body["creator"]["username"], "ada");
    assert!(first.body["createdAt"].is_string());

    let second = harness.get("/api/colab/kinase-atlas", None).await;
    assert_eq!(second.body["stats"]["views"], 2);
}

#[tokio::test]
async fn test_colab_page_without_creator_profile_is_anonymous() {
    let harness = TestHarness::new();
    harness.seed_colab("ghost", "Dark Matter", "dark-matter").await;

    let reply = harness.get("/api/colab/dark-matter", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["creator"]["name"], "Anonymous");
    assert_eq!(reply.body["creator"]["username"], "anonymous");
    assert_eq!(reply.body["creator"]["avatar"], "");
}

#[tokio::test]
async fn test_unknown_colab_is_not_found() {
    let harness = TestHarness::new();
    let reply = harness.get("/api/colab/nope", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "Colab not found");
}

#[tokio::test]
async fn test_fork_requires_sign_in() {
    let harness = TestHarness::new();
    harness.seed_colab("ada", "Kinase Atlas", "kinase-atlas").await;

    let reply = harness
        .post("/api/colab/kinase-atlas/fork", None, json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fork_copies_colab_and_counts_fork() {
    let harness = TestHarness::new();
    let original = harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;

    let reply = harness
        .post("/api/colab/kinase-atlas/fork", Some("grace"), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Kinase Atlas (Fork)");
    let slug = reply.body["slug"].as_str().unwrap();
    assert!(slug.starts_with("kinase-atlas-fork-"));

    let forked = harness
        .store
        .get_colab_by_slug(slug)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(forked.owner_id, "grace");
    assert_eq!(forked.forked_from.as_deref(), Some(original.id.as_str()));
    assert_eq!(forked.tags, vec!["genomics"]);
    assert!(forked.is_public);

    let original = harness
        .store
        .get_colab_by_slug("kinase-atlas")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original.forks, 1);
}

#[tokio::test]
async fn test_fork_unknown_colab_is_not_found() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/colab/nope/fork", Some("grace"), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_colab_makes_caller_owner() {
    let harness = TestHarness::new();

    let reply = harness
        .post(
            "/api/colabs",
            Some("ada"),
            json!({ "name": "Soil Microbiome", "tags": "soil, microbes" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["slug"], "soil-microbiome");
    assert_eq!(reply.body["owner_id"], "ada");
    assert_eq!(reply.body["tags"], json!(["soil", "microbes"]));

    let workspace = harness
        .get("/api/colab/soil-microbiome/workspace", Some("ada"))
        .await;
    assert_eq!(workspace.status, StatusCode::OK);
    assert_eq!(workspace.body["role"], "owner");
}

#[tokio::test]
async fn test_create_colab_rejects_duplicate_name() {
    let harness = TestHarness::new();
    harness
        .seed_colab("grace", "Soil Microbiome", "soil-microbiome")
        .await;

    let reply = harness
        .post("/api/colabs", Some("ada"), json!({ "name": "Soil microbiome" }))
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.error(), "A colab with this name already exists");
}

#[tokio::test]
async fn test_create_colab_requires_name() {
    let harness = TestHarness::new();
    let reply = harness
        .post("/api/colabs", Some("ada"), json!({ "name": "   " }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["fields"]["name"], "Name is required");
}

#[tokio::test]
async fn test_workspace_for_non_member_has_no_role() {
    let harness = TestHarness::new();
    harness.seed_profile("ada", "ada", "Ada Lovelace").await;
    harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;

    let reply = harness
        .get("/api/colab/kinase-atlas/workspace", Some("grace"))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["role"].is_null());
    assert_eq!(reply.body["creator"]["username"], "ada");
    assert_eq!(reply.body["contributions"], json!([]));
    assert_eq!(reply.body["notes"], json!([]));
}

#[tokio::test]
async fn test_workspace_requires_sign_in() {
    let harness = TestHarness::new();
    harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;
    let reply = harness.get("/api/colab/kinase-atlas/workspace", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_contributions_and_notes_show_in_workspace() {
    let harness = TestHarness::new();
    harness.seed_profile("grace", "grace", "Grace Hopper").await;
    harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;

    let contribution = harness
        .post(
            "/api/colab/kinase-atlas/contributions",
            Some("grace"),
            json!({ "description": "  Added the CDK family  " }),
        )
        .await;
    assert_eq!(contribution.status, StatusCode::CREATED);
    assert_eq!(contribution.body["description"], "Added the CDK family");
    assert_eq!(contribution.body["user"]["username"], "grace");

    let note = harness
        .post(
            "/api/colab/kinase-atlas/notes",
            Some("grace"),
            json!({ "content": "Check the 2019 screen" }),
        )
        .await;
    assert_eq!(note.status, StatusCode::CREATED);

    let workspace = harness
        .get("/api/colab/kinase-atlas/workspace", Some("grace"))
        .await;
    assert_eq!(workspace.body["contributions"][0]["description"], "Added the CDK family");
    assert_eq!(workspace.body["notes"][0]["content"], "Check the 2019 screen");
}

#[tokio::test]
async fn test_blank_entries_are_rejected() {
    let harness = TestHarness::new();
    harness
        .seed_colab("ada", "Kinase Atlas", "kinase-atlas")
        .await;

    let contribution = harness
        .post(
            "/api/colab/kinase-atlas/contributions",
            Some("grace"),
            json!({ "description": " " }),
        )
        .await;
    assert_eq!(contribution.status, StatusCode::BAD_REQUEST);
    assert_eq!(contribution.error(), "Description is required");

    let note = harness
        .post("/api/colab/kinase-atlas/notes", Some("grace"), json!({}))
        .await;
    assert_eq!(note.status, StatusCode::BAD_REQUEST);
    assert_eq!(note.body["fields"]["content"], "Content is required");
}

#[tokio::test]
async fn test_entry_on_unknown_colab_is_not_found() {
    let harness = TestHarness::new();
    let reply = harness
        .post(
            "/api/colab/nope/notes",
            Some("grace"),
            json!({ "content": "Hello" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
