//! The `Store` trait.

use std::sync::Arc;

use async_trait::async_trait;
use biohub_core::model::{
    AiPrompt, Challenge, ChallengeUpdate, Colab, ColabCounters, ColabMember, ColabView,
    Contribution, MemberRole, NewChallenge, NewColab, NewContribution, NewResearchNote, Profile,
    ResearchNote,
};
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Shared handle to a store.
pub type SharedStore = Arc<dyn Store>;

/// Every row operation the application performs.
///
/// Lists come back newest first. Single-row reads return `Ok(None)` when
/// nothing matches; that is never an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// The same store acting as the user who owns `access_token`.
    fn for_access_token(&self, access_token: &str) -> SharedStore;

    // ------------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------------

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>>;

    /// Inserts the profile or replaces the row with the same id.
    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile>;

    async fn profile_exists(&self, id: &str) -> Result<bool>;

    // ------------------------------------------------------------------------
    // Colabs
    // ------------------------------------------------------------------------

    async fn get_colab_by_slug(&self, slug: &str) -> Result<Option<Colab>>;

    /// The colab with its creator's profile summary.
    async fn get_colab_view(&self, slug: &str) -> Result<Option<ColabView>>;

    async fn insert_colab(&self, colab: &NewColab) -> Result<Colab>;

    /// Sets the given counters and `updated_at` on the colab `id`.
    async fn update_colab_counters(&self, id: &str, counters: &ColabCounters) -> Result<()>;

    /// Newest public colabs with their creators.
    async fn list_public_colabs(&self, limit: usize) -> Result<Vec<ColabView>>;

    /// Colabs where `user_id` is an accepted member.
    async fn list_member_colabs(&self, user_id: &str) -> Result<Vec<Colab>>;

    async fn add_member(&self, member: &ColabMember) -> Result<()>;

    async fn member_role(&self, colab_id: &str, user_id: &str) -> Result<Option<MemberRole>>;

    // ------------------------------------------------------------------------
    // Contributions and notes
    // ------------------------------------------------------------------------

    async fn list_contributions(&self, colab_id: &str) -> Result<Vec<Contribution>>;

    async fn insert_contribution(&self, contribution: &NewContribution) -> Result<Contribution>;

    async fn list_research_notes(&self, colab_id: &str) -> Result<Vec<ResearchNote>>;

    async fn insert_research_note(&self, note: &NewResearchNote) -> Result<ResearchNote>;

    // ------------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------------

    /// Newest challenges, all of them when `limit` is `None`.
    async fn list_challenges(&self, limit: Option<usize>) -> Result<Vec<Challenge>>;

    /// The challenge with its creator's profile summary.
    async fn get_challenge(&self, id: &str) -> Result<Option<Challenge>>;

    async fn insert_challenge(&self, challenge: &NewChallenge) -> Result<Challenge>;

    async fn update_challenge(&self, id: &str, update: &ChallengeUpdate) -> Result<Challenge>;

    async fn delete_challenge(&self, id: &str) -> Result<()>;

    // ------------------------------------------------------------------------
    // AI usage log
    // ------------------------------------------------------------------------

    async fn record_prompt(&self, prompt: &AiPrompt) -> Result<()>;

    /// Prompts recorded for `user_id` at or after `since`.
    async fn count_prompts_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64>;
}
