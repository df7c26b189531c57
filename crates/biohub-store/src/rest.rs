//! PostgREST-backed store.
//!
//! Every request carries the project's anon key as `apikey`. The bearer token
//! is the signed-in user's access token when the store was narrowed with
//! [`Store::for_access_token`], otherwise the anon key itself.

use std::sync::Arc;

use async_trait::async_trait;
use biohub_core::BiohubConfig;
use biohub_core::model::{
    AiPrompt, Challenge, ChallengeUpdate, Colab, ColabCounters, ColabMember, ColabView,
    Contribution, MemberRole, NewChallenge, NewColab, NewContribution, NewResearchNote, Profile,
    ResearchNote,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::error::{Result, StoreError};
use crate::store::{SharedStore, Store};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const NO_ROWS: &str = "PGRST116";

const AUTHOR_EMBED: &str = "*,user:profiles(id,username,full_name,avatar_url)";
const COLAB_CREATOR_EMBED: &str = "*,creator:profiles!owner_id(id,username,full_name,avatar_url)";
const CHALLENGE_CREATOR_EMBED: &str =
    "*,creator:profiles(id,full_name,username,avatar_url,role,institution)";

/// Error body PostgREST sends with non-2xx answers.
#[derive(Debug, Default, Deserialize)]
struct PgError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RoleRow {
    role: MemberRole,
}

#[derive(Deserialize)]
struct MembershipRow {
    colabs: Option<Colab>,
}

/// Store that talks to `{url}/rest/v1`.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("rest_url", &self.rest_url)
            .field("as_user", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// Creates a store for the project at `url`.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url, anon_key)
    }

    /// Creates a store sharing an existing HTTP client.
    pub fn with_client(client: Client, url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", url.trim().trim_end_matches('/')),
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    /// Creates a store from the `[supabase]` section.
    pub fn from_config(config: &BiohubConfig) -> Self {
        Self::new(config.supabase_url(), config.supabase.anon_key.clone())
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        tracing::debug!(
            %method,
            table,
            user_scoped = self.access_token.is_some(),
            "PostgREST request"
        );
        self.client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.request(Method::GET, table)
    }

    fn insert(&self, table: &str) -> RequestBuilder {
        self.request(Method::POST, table)
            .header("Prefer", "return=representation")
    }

    async fn fail(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let parsed: PgError = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| format!("HTTP {status}"));
        tracing::warn!(status, code = ?parsed.code, "PostgREST error: {message}");
        StoreError::backend(status, parsed.code, message)
    }

    async fn decode<T: DeserializeOwned>(table: &'static str, response: Response) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| StoreError::Decode { table, source })
    }

    /// Sends a request expecting a list of rows.
    async fn rows<T: DeserializeOwned>(
        table: &'static str,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Self::decode(table, response).await
    }

    /// Sends a request expecting at most one row.
    async fn maybe_one<T: DeserializeOwned>(
        table: &'static str,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.header("Accept", SINGLE_OBJECT).send().await?;
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            let err = Self::fail(response).await;
            return match err {
                StoreError::Backend { ref code, .. } if code.as_deref() == Some(NO_ROWS) => {
                    Ok(None)
                }
                other => Err(other),
            };
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Self::decode(table, response).await.map(Some)
    }

    /// Sends a request expecting exactly one row.
    async fn one<T: DeserializeOwned>(
        table: &'static str,
        key: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        Self::maybe_one(table, request)
            .await?
            .ok_or_else(|| StoreError::not_found(table, key))
    }

    /// Sends a request whose answer body is ignored.
    async fn execute(request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Parses the total from a `Content-Range` header such as `0-4/5` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl Store for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn for_access_token(&self, access_token: &str) -> SharedStore {
        let mut store = self.clone();
        store.access_token = Some(access_token.to_string());
        Arc::new(store)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let request = self
            .get("profiles")
            .query(&[("select", "*"), ("id", eq(id).as_str())]);
        Self::maybe_one("profiles", request).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile> {
        let request = self
            .request(Method::POST, "profiles")
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(profile);
        Self::one("profiles", &profile.id, request).await
    }

    async fn profile_exists(&self, id: &str) -> Result<bool> {
        let request = self
            .get("profiles")
            .query(&[("select", "id"), ("id", eq(id).as_str())]);
        let rows: Vec<IgnoredAny> = Self::rows("profiles", request).await?;
        Ok(!rows.is_empty())
    }

    async fn get_colab_by_slug(&self, slug: &str) -> Result<Option<Colab>> {
        let request = self
            .get("colabs")
            .query(&[("select", "*"), ("slug", eq(slug).as_str())]);
        Self::maybe_one("colabs", request).await
    }

    async fn get_colab_view(&self, slug: &str) -> Result<Option<ColabView>> {
        let request = self
            .get("colabs")
            .query(&[("select", COLAB_CREATOR_EMBED), ("slug", eq(slug).as_str())]);
        Self::maybe_one("colabs", request).await
    }

    async fn insert_colab(&self, colab: &NewColab) -> Result<Colab> {
        let request = self.insert("colabs").json(colab);
        Self::one("colabs", &colab.slug, request).await
    }

    async fn update_colab_counters(&self, id: &str, counters: &ColabCounters) -> Result<()> {
        let request = self
            .request(Method::PATCH, "colabs")
            .query(&[("id", eq(id))])
            .header("Prefer", "return=minimal")
            .json(counters);
        Self::execute(request).await
    }

    async fn list_public_colabs(&self, limit: usize) -> Result<Vec<ColabView>> {
        let limit = limit.to_string();
        let request = self.get("colabs").query(&[
            ("select", COLAB_CREATOR_EMBED),
            ("is_public", "eq.true"),
            ("order", "created_at.desc"),
            ("limit", limit.as_str()),
        ]);
        Self::rows("colabs", request).await
    }

    async fn list_member_colabs(&self, user_id: &str) -> Result<Vec<Colab>> {
        let request = self.get("colab_members").query(&[
            ("select", "colabs(*)"),
            ("user_id", eq(user_id).as_str()),
            ("status", "eq.accepted"),
        ]);
        let rows: Vec<MembershipRow> = Self::rows("colab_members", request).await?;
        Ok(rows.into_iter().filter_map(|row| row.colabs).collect())
    }

    async fn add_member(&self, member: &ColabMember) -> Result<()> {
        let request = self
            .request(Method::POST, "colab_members")
            .header("Prefer", "return=minimal")
            .json(member);
        Self::execute(request).await
    }

    async fn member_role(&self, colab_id: &str, user_id: &str) -> Result<Option<MemberRole>> {
        let request = self.get("colab_members").query(&[
            ("select", "role"),
            ("colab_id", eq(colab_id).as_str()),
            ("user_id", eq(user_id).as_str()),
        ]);
        let row: Option<RoleRow> = Self::maybe_one("colab_members", request).await?;
        Ok(row.map(|r| r.role))
    }

    async fn list_contributions(&self, colab_id: &str) -> Result<Vec<Contribution>> {
        let request = self.get("contributions").query(&[
            ("select", AUTHOR_EMBED),
            ("colab_id", eq(colab_id).as_str()),
            ("order", "created_at.desc"),
        ]);
        Self::rows("contributions", request).await
    }

    async fn insert_contribution(&self, contribution: &NewContribution) -> Result<Contribution> {
        let request = self
            .insert("contributions")
            .query(&[("select", AUTHOR_EMBED)])
            .json(contribution);
        Self::one("contributions", &contribution.colab_id, request).await
    }

    async fn list_research_notes(&self, colab_id: &str) -> Result<Vec<ResearchNote>> {
        let request = self.get("research_notes").query(&[
            ("select", AUTHOR_EMBED),
            ("colab_id", eq(colab_id).as_str()),
            ("order", "created_at.desc"),
        ]);
        Self::rows("research_notes", request).await
    }

    async fn insert_research_note(&self, note: &NewResearchNote) -> Result<ResearchNote> {
        let request = self
            .insert("research_notes")
            .query(&[("select", AUTHOR_EMBED)])
            .json(note);
        Self::one("research_notes", &note.colab_id, request).await
    }

    async fn list_challenges(&self, limit: Option<usize>) -> Result<Vec<Challenge>> {
        let mut request = self
            .get("challenges")
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }
        Self::rows("challenges", request).await
    }

    async fn get_challenge(&self, id: &str) -> Result<Option<Challenge>> {
        let request = self
            .get("challenges")
            .query(&[("select", CHALLENGE_CREATOR_EMBED), ("id", eq(id).as_str())]);
        Self::maybe_one("challenges", request).await
    }

    async fn insert_challenge(&self, challenge: &NewChallenge) -> Result<Challenge> {
        let request = self
            .insert("challenges")
            .query(&[("select", CHALLENGE_CREATOR_EMBED)])
            .json(challenge);
        Self::one("challenges", &challenge.title, request).await
    }

    async fn update_challenge(&self, id: &str, update: &ChallengeUpdate) -> Result<Challenge> {
        let request = self
            .request(Method::PATCH, "challenges")
            .query(&[("id", eq(id))])
            .query(&[("select", CHALLENGE_CREATOR_EMBED)])
            .header("Prefer", "return=representation")
            .json(update);
        Self::one("challenges", id, request).await
    }

    async fn delete_challenge(&self, id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "challenges")
            .query(&[("id", eq(id))]);
        Self::execute(request).await
    }

    async fn record_prompt(&self, prompt: &AiPrompt) -> Result<()> {
        let request = self
            .request(Method::POST, "ai_prompts")
            .header("Prefer", "return=minimal")
            .json(prompt);
        Self::execute(request).await
    }

    async fn count_prompts_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let request = self
            .request(Method::HEAD, "ai_prompts")
            .query(&[
                ("select", "user_id".to_string()),
                ("user_id", eq(user_id)),
                ("created_at", format!("gte.{since}")),
            ])
            .header("Prefer", "count=exact");
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        total.ok_or_else(|| {
            StoreError::backend(
                response.status().as_u16(),
                None,
                "missing Content-Range count",
            )
        })
    }
}
