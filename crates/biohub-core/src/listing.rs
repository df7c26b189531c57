//! Challenge search and pagination.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Challenge, Difficulty};

/// Challenges shown per listing page.
pub const CHALLENGES_PER_PAGE: usize = 9;

/// Items of each kind shown on the dashboard.
pub const DASHBOARD_LIMIT: usize = 6;

/// Query parameters of the challenge listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChallengeQuery {
    /// Case-insensitive search text.
    pub q: Option<String>,
    /// Exact difficulty filter; empty means all levels.
    #[serde(deserialize_with = "difficulty_filter")]
    pub difficulty: Option<Difficulty>,
    /// 1-based page number.
    pub page: Option<usize>,
}

fn difficulty_filter<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(level) if !level.trim().is_empty() => {
            level.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

impl ChallengeQuery {
    /// Returns `true` if `challenge` matches the search text and filter.
    pub fn matches(&self, challenge: &Challenge) -> bool {
        if let Some(wanted) = self.difficulty
            && challenge.difficulty != Some(wanted)
        {
            return false;
        }
        let needle = match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };
        challenge.title.to_lowercase().contains(&needle)
            || challenge.description.to_lowercase().contains(&needle)
            || challenge
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Keeps the challenges matching `query`, preserving input order.
///
/// Whitespace around the search text is ignored.
pub fn filter_challenges(challenges: Vec<Challenge>, query: &ChallengeQuery) -> Vec<Challenge> {
    challenges
        .into_iter()
        .filter(|c| query.matches(c))
        .collect()
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Cuts `items` into pages of `per_page` and returns page `page` (1-based).
///
/// Page 0 is treated as page 1. A page past the end has no items.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();
    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}
