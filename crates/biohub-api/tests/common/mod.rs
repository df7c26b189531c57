//! Common test utilities and harness for BioHub API integration tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use biohub_ai::{MockLlmProvider, ResearchAssistant};
use biohub_api::{AppState, Server};
use biohub_auth::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};
use biohub_core::BiohubConfig;
use biohub_core::model::{Challenge, Colab, NewChallenge, NewColab, Priority, Profile};
use biohub_store::{MemoryStore, Store};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// A description long enough to pass challenge validation.
pub const LONG_DESCRIPTION: &str =
    "Map the resistance genes that let soil bacteria survive last-line antibiotics.";

/// Accepts `token-<id>` as the bearer token of user `<id>`.
///
/// The user's email is `<id>@lab.org`. Any other token is rejected as a bad
/// signature.
pub struct StaticValidator;

impl TokenValidator for StaticValidator {
    fn validate(
        &self,
        token: &str,
        _config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = match token.strip_prefix("token-").filter(|id| !id.is_empty()) {
            Some(id) => Ok(AuthenticatedUser {
                id: id.to_string(),
                email: Some(format!("{id}@lab.org")),
                access_token: token.to_string(),
            }),
            None => Err(AuthError::InvalidSignature("unknown test token".into())),
        };
        Box::pin(async move { result })
    }
}

/// Bearer token that [`StaticValidator`] maps to `user_id`.
pub fn token(user_id: &str) -> String {
    format!("token-{user_id}")
}

/// A reply decoded for assertions.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// The `error` message of an error reply.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Test harness for integration tests.
///
/// Holds the in-memory store and mock assistant behind the app so tests
/// can seed rows and inspect what the handlers did.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub llm: Arc<MockLlmProvider>,
    app: Router,
}

impl TestHarness {
    /// Creates a harness whose assistant always answers "Mock answer".
    pub fn new() -> Self {
        Self::with_llm(Arc::new(MockLlmProvider::with_responses(["Mock answer"])))
    }

    /// Creates a harness with a custom mock provider.
    pub fn with_llm(llm: Arc<MockLlmProvider>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            BiohubConfig::default(),
            store.clone(),
            Arc::new(StaticValidator),
            ResearchAssistant::new(llm.clone()),
        );
        let app = Server::new(state).app();
        Self { store, llm, app }
    }

    /// Sends a request, optionally as `user_id` and with a JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token(user_id)));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    /// Sends a prepared request.
    pub async fn send_request(&self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, body }
    }

    pub async fn get(&self, uri: &str, user_id: Option<&str>) -> Reply {
        self.send(Method::GET, uri, user_id, None).await
    }

    pub async fn post(&self, uri: &str, user_id: Option<&str>, body: Value) -> Reply {
        self.send(Method::POST, uri, user_id, Some(body)).await
    }

    pub async fn put(&self, uri: &str, user_id: Option<&str>, body: Value) -> Reply {
        self.send(Method::PUT, uri, user_id, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user_id: Option<&str>) -> Reply {
        self.send(Method::DELETE, uri, user_id, None).await
    }

    /// Saves a profile row for `id`.
    pub async fn seed_profile(&self, id: &str, username: &str, full_name: &str) -> Profile {
        let profile = Profile {
            id: id.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            role: "Postdoc".to_string(),
            institution: "Marine Biology Lab".to_string(),
            ..Profile::default()
        };
        self.store.upsert_profile(&profile).await.unwrap()
    }

    /// Inserts a public colab owned by `owner_id`.
    pub async fn seed_colab(&self, owner_id: &str, name: &str, slug: &str) -> Colab {
        self.store
            .insert_colab(&NewColab {
                name: name.to_string(),
                slug: slug.to_string(),
                description: Some(format!("{name} description")),
                readme: Some(format!("# {name}")),
                owner_id: owner_id.to_string(),
                is_public: true,
                visibility: None,
                forked_from: None,
                tags: vec!["genomics".to_string()],
            })
            .await
            .unwrap()
    }

    /// Inserts a challenge posted by `creator_id`.
    pub async fn seed_challenge(&self, creator_id: &str, title: &str, tags: &[&str]) -> Challenge {
        self.store
            .insert_challenge(&NewChallenge {
                title: title.to_string(),
                description: LONG_DESCRIPTION.to_string(),
                disease_focus: "Infectious disease".to_string(),
                priority_level: Priority::High,
                expected_outcome: "A curated gene catalogue".to_string(),
                resources_needed: None,
                deadline: None,
                reward_amount: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                creator_id: creator_id.to_string(),
            })
            .await
            .unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
