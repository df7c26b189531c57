//! In-process store.

use std::sync::Arc;

use async_trait::async_trait;
use biohub_core::model::{
    AiPrompt, Challenge, ChallengeUpdate, Colab, ColabCounters, ColabMember, ColabView,
    Contribution, MemberRole, MemberStatus, NewChallenge, NewColab, NewContribution,
    NewResearchNote, Profile, ProfileSummary, ResearchNote,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{SharedStore, Store};

#[derive(Debug, Default)]
struct Tables {
    profiles: Vec<Profile>,
    colabs: Vec<Colab>,
    members: Vec<ColabMember>,
    contributions: Vec<Contribution>,
    notes: Vec<ResearchNote>,
    challenges: Vec<Challenge>,
    prompts: Vec<AiPrompt>,
}

impl Tables {
    fn summary(&self, user_id: &str) -> Option<ProfileSummary> {
        self.profiles
            .iter()
            .find(|p| p.id == user_id)
            .map(ProfileSummary::from)
    }

    /// Author summary as embedded next to contributions and notes.
    fn author(&self, user_id: &str) -> Option<ProfileSummary> {
        self.summary(user_id).map(|s| ProfileSummary {
            role: None,
            institution: None,
            bio: None,
            ..s
        })
    }

    fn colab_view(&self, colab: &Colab) -> ColabView {
        ColabView {
            colab: colab.clone(),
            creator: self.author(&colab.owner_id),
        }
    }

    fn challenge_with_creator(&self, challenge: &Challenge) -> Challenge {
        let creator = self
            .summary(&challenge.creator_id)
            .map(|s| ProfileSummary { bio: None, ..s });
        Challenge {
            creator,
            ..challenge.clone()
        }
    }
}

/// Newest first; among equal timestamps, the later insert first.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    out
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Store holding every table in memory.
///
/// Clones share the same tables. Row-level security is not emulated, so
/// [`Store::for_access_token`] returns a handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in the AI usage log.
    pub async fn prompt_count(&self) -> usize {
        self.tables.read().await.prompts.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn for_access_token(&self, _access_token: &str) -> SharedStore {
        Arc::new(self.clone())
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut row = profile.clone();
        match tables.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                row.created_at = existing.created_at.or(Some(now));
                row.reputation_score = existing.reputation_score;
                row.updated_at = profile.updated_at.or(Some(now));
                *existing = row.clone();
            }
            None => {
                row.created_at = Some(now);
                row.updated_at = profile.updated_at.or(Some(now));
                tables.profiles.push(row.clone());
            }
        }
        Ok(row)
    }

    async fn profile_exists(&self, id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().any(|p| p.id == id))
    }

    async fn get_colab_by_slug(&self, slug: &str) -> Result<Option<Colab>> {
        let tables = self.tables.read().await;
        Ok(tables.colabs.iter().find(|c| c.slug == slug).cloned())
    }

    async fn get_colab_view(&self, slug: &str) -> Result<Option<ColabView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .colabs
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| tables.colab_view(c)))
    }

    async fn insert_colab(&self, colab: &NewColab) -> Result<Colab> {
        let mut tables = self.tables.write().await;
        if tables.colabs.iter().any(|c| c.slug == colab.slug) {
            return Err(StoreError::backend(
                409,
                Some("23505".to_string()),
                format!("duplicate key value violates unique constraint: slug {}", colab.slug),
            ));
        }
        let now = Utc::now();
        let row = Colab {
            id: new_id(),
            name: colab.name.clone(),
            slug: colab.slug.clone(),
            description: colab.description.clone(),
            readme: colab.readme.clone(),
            is_public: colab.is_public,
            visibility: colab.visibility.clone(),
            owner_id: colab.owner_id.clone(),
            forked_from: colab.forked_from.clone(),
            tags: colab.tags.clone(),
            forks: 0,
            stars: 0,
            views: 0,
            contributors: None,
            created_at: now,
            updated_at: now,
        };
        tables.colabs.push(row.clone());
        Ok(row)
    }

    async fn update_colab_counters(&self, id: &str, counters: &ColabCounters) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(colab) = tables.colabs.iter_mut().find(|c| c.id == id) {
            if let Some(views) = counters.views {
                colab.views = views;
            }
            if let Some(forks) = counters.forks {
                colab.forks = forks;
            }
            colab.updated_at = counters.updated_at;
        }
        Ok(())
    }

    async fn list_public_colabs(&self, limit: usize) -> Result<Vec<ColabView>> {
        let tables = self.tables.read().await;
        let public: Vec<Colab> = tables
            .colabs
            .iter()
            .filter(|c| c.is_public)
            .cloned()
            .collect();
        Ok(newest_first(&public, |c| c.created_at)
            .iter()
            .take(limit)
            .map(|c| tables.colab_view(c))
            .collect())
    }

    async fn list_member_colabs(&self, user_id: &str) -> Result<Vec<Colab>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id && m.status == MemberStatus::Accepted)
            .filter_map(|m| tables.colabs.iter().find(|c| c.id == m.colab_id).cloned())
            .collect())
    }

    async fn add_member(&self, member: &ColabMember) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .members
            .iter()
            .any(|m| m.colab_id == member.colab_id && m.user_id == member.user_id)
        {
            return Err(StoreError::backend(
                409,
                Some("23505".to_string()),
                "duplicate key value violates unique constraint: colab_members",
            ));
        }
        tables.members.push(member.clone());
        Ok(())
    }

    async fn member_role(&self, colab_id: &str, user_id: &str) -> Result<Option<MemberRole>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .find(|m| m.colab_id == colab_id && m.user_id == user_id)
            .map(|m| m.role))
    }

    async fn list_contributions(&self, colab_id: &str) -> Result<Vec<Contribution>> {
        let tables = self.tables.read().await;
        let rows: Vec<Contribution> = tables
            .contributions
            .iter()
            .filter(|c| c.colab_id == colab_id)
            .map(|c| Contribution {
                user: tables.author(&c.user_id),
                ..c.clone()
            })
            .collect();
        Ok(newest_first(&rows, |c| c.created_at))
    }

    async fn insert_contribution(&self, contribution: &NewContribution) -> Result<Contribution> {
        let mut tables = self.tables.write().await;
        let row = Contribution {
            id: new_id(),
            colab_id: contribution.colab_id.clone(),
            user_id: contribution.user_id.clone(),
            description: contribution.description.clone(),
            created_at: Utc::now(),
            user: None,
        };
        tables.contributions.push(row.clone());
        Ok(Contribution {
            user: tables.author(&row.user_id),
            ..row
        })
    }

    async fn list_research_notes(&self, colab_id: &str) -> Result<Vec<ResearchNote>> {
        let tables = self.tables.read().await;
        let rows: Vec<ResearchNote> = tables
            .notes
            .iter()
            .filter(|n| n.colab_id == colab_id)
            .map(|n| ResearchNote {
                user: tables.author(&n.user_id),
                ..n.clone()
            })
            .collect();
        Ok(newest_first(&rows, |n| n.created_at))
    }

    async fn insert_research_note(&self, note: &NewResearchNote) -> Result<ResearchNote> {
        let mut tables = self.tables.write().await;
        let row = ResearchNote {
            id: new_id(),
            colab_id: note.colab_id.clone(),
            user_id: note.user_id.clone(),
            content: note.content.clone(),
            created_at: Utc::now(),
            user: None,
        };
        tables.notes.push(row.clone());
        Ok(ResearchNote {
            user: tables.author(&row.user_id),
            ..row
        })
    }

    async fn list_challenges(&self, limit: Option<usize>) -> Result<Vec<Challenge>> {
        let tables = self.tables.read().await;
        let rows = newest_first(&tables.challenges, |c| c.created_at);
        Ok(match limit {
            Some(limit) => rows.into_iter().take(limit).collect(),
            None => rows,
        })
    }

    async fn get_challenge(&self, id: &str) -> Result<Option<Challenge>> {
        let tables = self.tables.read().await;
        Ok(tables
            .challenges
            .iter()
            .find(|c| c.id == id)
            .map(|c| tables.challenge_with_creator(c)))
    }

    async fn insert_challenge(&self, challenge: &NewChallenge) -> Result<Challenge> {
        let mut tables = self.tables.write().await;
        let row = Challenge {
            id: new_id(),
            title: challenge.title.clone(),
            description: challenge.description.clone(),
            disease_focus: Some(challenge.disease_focus.clone()),
            priority_level: challenge.priority_level,
            difficulty: None,
            expected_outcome: Some(challenge.expected_outcome.clone()),
            resources_needed: challenge.resources_needed.clone(),
            deadline: challenge.deadline,
            reward_amount: challenge.reward_amount,
            tags: challenge.tags.clone(),
            participants_count: 0,
            creator_id: challenge.creator_id.clone(),
            created_at: Utc::now(),
            updated_at: None,
            creator: None,
        };
        tables.challenges.push(row.clone());
        Ok(tables.challenge_with_creator(&row))
    }

    async fn update_challenge(&self, id: &str, update: &ChallengeUpdate) -> Result<Challenge> {
        let mut tables = self.tables.write().await;
        let row = tables
            .challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("challenges", id))?;
        row.title = update.title.clone();
        row.description = update.description.clone();
        row.difficulty = Some(update.difficulty);
        row.tags = update.tags.clone();
        row.updated_at = Some(update.updated_at);
        let row = row.clone();
        Ok(tables.challenge_with_creator(&row))
    }

    async fn delete_challenge(&self, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.challenges.retain(|c| c.id != id);
        Ok(())
    }

    async fn record_prompt(&self, prompt: &AiPrompt) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut row = prompt.clone();
        row.created_at = Some(row.created_at.unwrap_or_else(Utc::now));
        tables.prompts.push(row);
        Ok(())
    }

    async fn count_prompts_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .prompts
            .iter()
            .filter(|p| p.user_id == user_id && p.created_at.is_some_and(|at| at >= since))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use biohub_core::model::Priority;
    use chrono::Duration;

    fn profile(id: &str, username: &str) -> Profile {
        Profile {
            id: id.into(),
            username: username.into(),
            full_name: format!("{username} full"),
            institution: "Institute".into(),
            ..Default::default()
        }
    }

    fn new_colab(slug: &str, owner: &str, is_public: bool) -> NewColab {
        NewColab {
            name: slug.to_uppercase(),
            slug: slug.into(),
            description: None,
            readme: None,
            owner_id: owner.into(),
            is_public,
            visibility: None,
            forked_from: None,
            tags: vec![],
        }
    }

    fn new_challenge(title: &str) -> NewChallenge {
        NewChallenge {
            title: title.into(),
            description: "d".repeat(60),
            disease_focus: "Sepsis".into(),
            priority_level: Priority::High,
            expected_outcome: "Panel".into(),
            resources_needed: None,
            deadline: None,
            reward_amount: None,
            tags: vec![],
            creator_id: "u1".into(),
        }
    }

    #[tokio::test]
    async fn test_profile_upsert_replaces() {
        let store = MemoryStore::new();
        assert!(!store.profile_exists("u1").await.unwrap());

        let first = store.upsert_profile(&profile("u1", "ada")).await.unwrap();
        let second = store.upsert_profile(&profile("u1", "ada2")).await.unwrap();
        assert_eq!(second.username, "ada2");
        assert_eq!(second.created_at, first.created_at);
        assert!(store.profile_exists("u1").await.unwrap());
        assert_eq!(
            store.get_profile("u1").await.unwrap().unwrap().username,
            "ada2"
        );
    }

    #[tokio::test]
    async fn test_colab_view_embeds_creator() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("u1", "ada")).await.unwrap();
        store
            .insert_colab(&new_colab("atlas", "u1", true))
            .await
            .unwrap();

        let view = store.get_colab_view("atlas").await.unwrap().unwrap();
        let creator = view.creator.unwrap();
        assert_eq!(creator.username, "ada");
        assert_eq!(creator.institution, None);
        assert!(store.get_colab_view("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let store = MemoryStore::new();
        store
            .insert_colab(&new_colab("atlas", "u1", true))
            .await
            .unwrap();
        let err = store
            .insert_colab(&new_colab("atlas", "u2", true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_public_colabs_newest_first_with_limit() {
        let store = MemoryStore::new();
        for slug in ["a", "b", "c"] {
            store.insert_colab(&new_colab(slug, "u1", true)).await.unwrap();
        }
        store
            .insert_colab(&new_colab("hidden", "u1", false))
            .await
            .unwrap();

        let listed = store.list_public_colabs(2).await.unwrap();
        let slugs: Vec<_> = listed.iter().map(|v| v.colab.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_membership_and_roles() {
        let store = MemoryStore::new();
        let colab = store
            .insert_colab(&new_colab("atlas", "u1", true))
            .await
            .unwrap();
        store
            .add_member(&ColabMember {
                colab_id: colab.id.clone(),
                user_id: "u1".into(),
                role: MemberRole::Owner,
                status: MemberStatus::Accepted,
            })
            .await
            .unwrap();
        store
            .add_member(&ColabMember {
                colab_id: colab.id.clone(),
                user_id: "u2".into(),
                role: MemberRole::Contributor,
                status: MemberStatus::Pending,
            })
            .await
            .unwrap();

        assert_eq!(
            store.member_role(&colab.id, "u1").await.unwrap(),
            Some(MemberRole::Owner)
        );
        assert_eq!(store.member_role(&colab.id, "u3").await.unwrap(), None);
        assert_eq!(store.list_member_colabs("u1").await.unwrap().len(), 1);
        assert!(store.list_member_colabs("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counters_update() {
        let store = MemoryStore::new();
        let colab = store
            .insert_colab(&new_colab("atlas", "u1", true))
            .await
            .unwrap();
        let later = colab.updated_at + Duration::seconds(5);
        store
            .update_colab_counters(
                &colab.id,
                &ColabCounters {
                    views: Some(4),
                    forks: None,
                    updated_at: later,
                },
            )
            .await
            .unwrap();
        let stored = store.get_colab_by_slug("atlas").await.unwrap().unwrap();
        assert_eq!(stored.views, 4);
        assert_eq!(stored.forks, 0);
        assert_eq!(stored.updated_at, later);
    }

    #[tokio::test]
    async fn test_entries_newest_first_with_author() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("u1", "ada")).await.unwrap();
        for text in ["first", "second"] {
            store
                .insert_contribution(&NewContribution {
                    colab_id: "c1".into(),
                    user_id: "u1".into(),
                    description: text.into(),
                })
                .await
                .unwrap();
        }
        let note = store
            .insert_research_note(&NewResearchNote {
                colab_id: "c1".into(),
                user_id: "u1".into(),
                content: "note".into(),
            })
            .await
            .unwrap();
        assert_eq!(note.user.unwrap().username, "ada");

        let listed = store.list_contributions("c1").await.unwrap();
        assert_eq!(listed[0].description, "second");
        assert_eq!(listed[1].description, "first");
        assert_eq!(store.list_research_notes("c1").await.unwrap().len(), 1);
        assert!(store.list_contributions("c2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_challenge_lifecycle() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("u1", "ada")).await.unwrap();
        let created = store.insert_challenge(&new_challenge("One")).await.unwrap();
        store.insert_challenge(&new_challenge("Two")).await.unwrap();
        assert_eq!(created.creator.as_ref().unwrap().username, "ada");

        let listed = store.list_challenges(Some(1)).await.unwrap();
        assert_eq!(listed[0].title, "Two");

        let update = ChallengeUpdate {
            title: "One v2".into(),
            description: "Shorter".into(),
            difficulty: biohub_core::model::Difficulty::Advanced,
            tags: vec!["x".into()],
            updated_at: Utc::now(),
        };
        let updated = store.update_challenge(&created.id, &update).await.unwrap();
        assert_eq!(updated.title, "One v2");
        assert!(updated.updated_at.is_some());

        store.delete_challenge(&created.id).await.unwrap();
        assert!(store.get_challenge(&created.id).await.unwrap().is_none());
        assert!(
            store
                .update_challenge(&created.id, &update)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_prompt_counting_respects_window() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (user, at) in [
            ("u1", now - Duration::days(40)),
            ("u1", now),
            ("u1", now),
            ("u2", now),
        ] {
            store
                .record_prompt(&AiPrompt {
                    user_id: user.into(),
                    prompt: "p".into(),
                    response: "r".into(),
                    model: "gemini-pro".into(),
                    created_at: Some(at),
                })
                .await
                .unwrap();
        }
        let since = now - Duration::days(1);
        assert_eq!(store.count_prompts_since("u1", since).await.unwrap(), 2);
        assert_eq!(store.prompt_count().await, 4);
    }

    #[tokio::test]
    async fn test_access_token_handle_shares_tables() {
        let store = MemoryStore::new();
        let scoped = store.for_access_token("token");
        scoped.upsert_profile(&profile("u1", "ada")).await.unwrap();
        assert!(store.profile_exists("u1").await.unwrap());
    }
}
