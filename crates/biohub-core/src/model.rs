//! Records stored by the hosted database.
//!
//! Field names follow the table columns (snake_case) so rows deserialize
//! straight from the REST answers. Nullable columns that the application
//! always treats as "empty" (`tags`, counters, profile text fields) are
//! read through [`nullable`] so a SQL `NULL` becomes the default value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Deserialize a nullable column, mapping `null` to `T::default()`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Profiles
// ============================================================================

/// A researcher's public profile (`profiles` table).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth user.
    pub id: String,
    /// Unique handle.
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: String,
    /// One of `student`, `researcher`, `professor`, `industry`, or empty.
    #[serde(default, deserialize_with = "nullable")]
    pub role: String,
    #[serde(default, deserialize_with = "nullable")]
    pub institution: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: String,
    #[serde(default, deserialize_with = "nullable")]
    pub twitter_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub linkedin_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub github_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub website_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing)]
    pub reputation_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The subset of a profile embedded next to authored records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            id: profile.id.clone(),
            username: profile.username.clone(),
            full_name: non_empty(&profile.full_name),
            avatar_url: profile.avatar_url.clone(),
            role: non_empty(&profile.role),
            institution: non_empty(&profile.institution),
            bio: non_empty(&profile.bio),
        }
    }
}

// ============================================================================
// Colabs
// ============================================================================

/// A collaborative research project (`colabs` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colab {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    /// Creator of the colab. Older rows call this column `creator_id`.
    #[serde(alias = "creator_id")]
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub forks: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub stars: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub views: u64,
    /// Contributor count; `None` when the column was never populated.
    #[serde(default)]
    pub contributors: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A colab joined with its creator's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColabView {
    #[serde(flatten)]
    pub colab: Colab,
    #[serde(default)]
    pub creator: Option<ProfileSummary>,
}

/// Insert payload for a new colab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewColab {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub readme: Option<String>,
    pub owner_id: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<String>,
    pub tags: Vec<String>,
}

/// Counter update for a colab. Unset counters are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColabCounters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

/// Role of a member within a colab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Maintainer,
    Contributor,
    Viewer,
}

/// Whether a membership invitation has been accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Pending,
    Accepted,
}

/// A user's membership in a colab (`colab_members` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColabMember {
    pub colab_id: String,
    pub user_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub status: MemberStatus,
}

// ============================================================================
// Contributions and research notes
// ============================================================================

/// A contribution logged against a colab (`contributions` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub colab_id: String,
    pub user_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<ProfileSummary>,
}

/// Insert payload for a contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContribution {
    pub colab_id: String,
    pub user_id: String,
    pub description: String,
}

/// A research note attached to a colab (`research_notes` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchNote {
    pub id: String,
    pub colab_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<ProfileSummary>,
}

/// Insert payload for a research note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewResearchNote {
    pub colab_id: String,
    pub user_id: String,
    pub content: String,
}

// ============================================================================
// Challenges
// ============================================================================

/// Urgency of a challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All levels, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Column value for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| Error::validation_field("priority_level", "Unknown priority level"))
    }
}

/// Skill level a challenge calls for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Column value for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(Error::validation_field("difficulty", "Unknown difficulty")),
        }
    }
}

/// A posted research problem (`challenges` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub disease_focus: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub priority_level: Priority,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub expected_outcome: Option<String>,
    #[serde(default)]
    pub resources_needed: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub reward_amount: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub participants_count: u64,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator: Option<ProfileSummary>,
}

/// Validated insert payload for a challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub disease_focus: String,
    pub priority_level: Priority,
    pub expected_outcome: String,
    pub resources_needed: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub reward_amount: Option<f64>,
    pub tags: Vec<String>,
    pub creator_id: String,
}

/// Validated update payload for a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeUpdate {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// AI usage log
// ============================================================================

/// One assistant exchange (`ai_prompts` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiPrompt {
    pub user_id: String,
    pub prompt: String,
    pub response: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
