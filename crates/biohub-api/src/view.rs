//! Response shapes composed from several rows.

use biohub_core::PromptQuota;
use biohub_core::model::{
    Challenge, Colab, ColabView, Contribution, MemberRole, Profile, ProfileSummary, ResearchNote,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public colab page, in the front-end's camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColabPage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub readme: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorCard,
    pub stats: ColabStats,
    pub tags: Vec<String>,
}

/// Who made a colab, with placeholders for missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorCard {
    pub name: String,
    pub avatar: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColabStats {
    pub forks: u64,
    pub contributors: u64,
    pub stars: u64,
    pub views: u64,
}

impl CreatorCard {
    fn from_summary(creator: Option<&ProfileSummary>) -> Self {
        let pick = |value: Option<&str>, fallback: &str| {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            name: pick(creator.and_then(|c| c.full_name.as_deref()), "Anonymous"),
            avatar: pick(creator.and_then(|c| c.avatar_url.as_deref()), ""),
            username: pick(creator.map(|c| c.username.as_str()), "anonymous"),
        }
    }
}

impl ColabPage {
    /// Formats `view` as it looks after this visit was counted.
    ///
    /// `views` is the stored count before the visit; the page shows it plus
    /// one. A missing or zero contributor count shows as 1.
    pub fn from_view(view: ColabView, views: u64) -> Self {
        let creator = CreatorCard::from_summary(view.creator.as_ref());
        let colab = view.colab;
        Self {
            stats: ColabStats {
                forks: colab.forks,
                contributors: colab.contributors.filter(|&c| c > 0).unwrap_or(1),
                stars: colab.stars,
                views: views + 1,
            },
            id: colab.id,
            name: colab.name,
            description: colab.description.unwrap_or_default(),
            readme: colab.readme.unwrap_or_default(),
            slug: colab.slug,
            created_at: colab.created_at,
            updated_at: colab.updated_at,
            creator,
            tags: colab.tags,
        }
    }
}

/// Reply to a successful fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkedColab {
    pub id: String,
    pub slug: String,
    pub name: String,
}

impl From<Colab> for ForkedColab {
    fn from(colab: Colab) -> Self {
        Self {
            id: colab.id,
            slug: colab.slug,
            name: colab.name,
        }
    }
}

/// Everything the colab workspace page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workspace {
    pub colab: Colab,
    pub creator: Option<ProfileSummary>,
    /// The caller's role; `None` when they are not a member.
    pub role: Option<MemberRole>,
    pub contributions: Vec<Contribution>,
    pub notes: Vec<ResearchNote>,
}

/// Prompt allowance as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaView {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

impl From<PromptQuota> for QuotaView {
    fn from(quota: PromptQuota) -> Self {
        Self {
            used: quota.used,
            limit: quota.limit,
            remaining: quota.remaining(),
        }
    }
}

/// The signed-in home page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub profile: Option<Profile>,
    /// Colabs the caller is an accepted member of.
    pub colabs: Vec<Colab>,
    /// Newest public colabs.
    pub open_colabs: Vec<ColabView>,
    /// Newest challenges.
    pub challenges: Vec<Challenge>,
    pub quota: QuotaView,
}
