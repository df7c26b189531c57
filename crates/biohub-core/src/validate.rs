//! Form validation and normalization.
//!
//! Forms arrive as loosely typed JSON from the browser. Each form type
//! checks its rules, collects every failing field into [`FieldErrors`],
//! and on success produces the typed insert/update payload.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, FieldErrors, Result};
use crate::model::{ChallengeUpdate, Difficulty, NewChallenge, NewColab, Priority, Profile};
use crate::util::slug::slugify;
use crate::util::tags::parse_tags;

/// Maximum length of a challenge title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Minimum length of a challenge description, in characters.
pub const DESCRIPTION_MIN_CHARS: usize = 50;

/// A numeric form field that may be posted as a number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    /// Sent as a JSON number.
    Number(f64),
    /// Sent as text, possibly blank.
    Text(String),
}

impl NumberInput {
    /// Parses the value. `Ok(None)` means the field was left blank.
    fn parse(&self) -> std::result::Result<Option<f64>, ()> {
        match self {
            NumberInput::Number(n) => Ok(Some(*n)),
            NumberInput::Text(s) if s.trim().is_empty() => Ok(None),
            NumberInput::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| ()),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Challenges
// ============================================================================

/// The "post a challenge" form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChallengeDraft {
    pub title: String,
    pub description: String,
    pub disease_focus: String,
    pub priority_level: Option<String>,
    pub expected_outcome: String,
    pub resources_needed: Option<String>,
    pub deadline: Option<String>,
    pub reward_amount: Option<NumberInput>,
    /// Comma-separated tags.
    pub tags: String,
}

impl ChallengeDraft {
    /// Checks every rule and returns the failing fields.
    ///
    /// Rules for the same field run in order, so the last failing rule's
    /// message is the one kept.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.title) {
            errors.insert("title", "Title is required");
        }
        if is_blank(&self.description) {
            errors.insert("description", "Description is required");
        }
        if is_blank(&self.disease_focus) {
            errors.insert("disease_focus", "Disease focus is required");
        }
        if is_blank(&self.expected_outcome) {
            errors.insert("expected_outcome", "Expected outcome is required");
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.insert("title", "Title must be less than 100 characters");
        }
        if self.description.chars().count() < DESCRIPTION_MIN_CHARS {
            errors.insert(
                "description",
                "Description must be at least 50 characters",
            );
        }
        if let Some(reward) = &self.reward_amount {
            let valid = match reward.parse() {
                Ok(Some(n)) => n.is_finite() && n >= 0.0,
                Ok(None) => true,
                Err(()) => false,
            };
            if !valid {
                errors.insert("reward_amount", "Reward must be a positive number");
            }
        }
        if let Some(deadline) = self.deadline.as_deref().filter(|d| !is_blank(d))
            && parse_date(deadline).is_none()
        {
            errors.insert("deadline", "Deadline must be a valid date");
        }
        if let Some(level) = self.priority_level.as_deref().filter(|p| !is_blank(p))
            && level.parse::<Priority>().is_err()
        {
            errors.insert("priority_level", "Unknown priority level");
        }

        errors
    }

    /// Validates the form and builds the insert payload for `creator_id`.
    pub fn into_new_challenge(self, creator_id: impl Into<String>) -> Result<NewChallenge> {
        self.check().into_result()?;

        let priority_level = match self.priority_level.as_deref().filter(|p| !is_blank(p)) {
            Some(level) => level.parse()?,
            None => Priority::default(),
        };
        let reward_amount = match &self.reward_amount {
            Some(reward) => reward
                .parse()
                .map_err(|()| Error::validation_field("reward_amount", "Reward must be a positive number"))?,
            None => None,
        };
        let deadline = self.deadline.as_deref().and_then(parse_date);

        Ok(NewChallenge {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            disease_focus: self.disease_focus.trim().to_string(),
            priority_level,
            expected_outcome: self.expected_outcome.trim().to_string(),
            resources_needed: trimmed_or_none(self.resources_needed.as_deref()),
            deadline,
            reward_amount,
            tags: parse_tags(&self.tags),
            creator_id: creator_id.into(),
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// The "edit challenge" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChallengeEdit {
    pub title: String,
    pub description: String,
    pub difficulty: Option<String>,
    /// Comma-separated tags.
    pub tags: String,
}

impl ChallengeEdit {
    /// Checks every rule and returns the failing fields.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.title) {
            errors.insert("title", "Title is required");
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.insert("title", "Title must be less than 100 characters");
        }
        if is_blank(&self.description) {
            errors.insert("description", "Description is required");
        }
        if let Some(level) = self.difficulty.as_deref().filter(|d| !is_blank(d))
            && level.parse::<Difficulty>().is_err()
        {
            errors.insert("difficulty", "Unknown difficulty");
        }
        errors
    }

    /// Validates the form and builds the update payload stamped with `now`.
    pub fn into_update(self, now: DateTime<Utc>) -> Result<ChallengeUpdate> {
        self.check().into_result()?;
        let difficulty = match self.difficulty.as_deref().filter(|d| !is_blank(d)) {
            Some(level) => level.parse()?,
            None => Difficulty::default(),
        };
        Ok(ChallengeUpdate {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            difficulty,
            tags: parse_tags(&self.tags),
            updated_at: now,
        })
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// The profile form as posted; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub id: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub twitter_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    /// Kept only when it is a list; other shapes are discarded.
    pub interests: Option<Value>,
}

/// Normalizes a posted profile into the row to upsert.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the id or username is missing.
pub fn clean_profile(form: ProfileForm, now: DateTime<Utc>) -> Result<Profile> {
    let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();

    let id = text(form.id);
    if id.is_empty() {
        return Err(Error::validation_field("id", "Profile ID is required"));
    }
    let username = text(form.username);
    if username.is_empty() {
        return Err(Error::validation_field("username", "Username is required"));
    }

    let interests = match form.interests {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Ok(Profile {
        id,
        username,
        full_name: text(form.full_name),
        avatar_url: trimmed_or_none(form.avatar_url.as_deref()),
        bio: text(form.bio),
        role: text(form.role),
        institution: text(form.institution),
        location: text(form.location),
        gender: text(form.gender),
        twitter_url: text(form.twitter_url),
        linkedin_url: text(form.linkedin_url),
        github_url: text(form.github_url),
        website_url: text(form.website_url),
        interests,
        reputation_score: 0,
        created_at: None,
        updated_at: Some(now),
    })
}

/// A profile as shown on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileState {
    #[serde(flatten)]
    pub profile: Profile,
    /// `true` when no row exists yet and this is a generated default.
    pub is_new: bool,
}

/// Builds the placeholder profile for a user who has never saved one.
///
/// The username is the local part of the email address, falling back to
/// `user_<unix-millis>`.
pub fn default_profile(user_id: &str, email: Option<&str>, now: DateTime<Utc>) -> ProfileState {
    let username = email
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("user_{}", now.timestamp_millis()));

    ProfileState {
        profile: Profile {
            id: user_id.to_string(),
            username,
            ..Profile::default()
        },
        is_new: true,
    }
}

// ============================================================================
// Colabs and entries
// ============================================================================

/// The "create colab" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColabDraft {
    pub name: String,
    pub description: Option<String>,
    pub readme: Option<String>,
    pub is_public: Option<bool>,
    /// Comma-separated tags.
    pub tags: String,
}

impl ColabDraft {
    /// Validates the form and builds the insert payload for `owner_id`.
    ///
    /// The slug is derived from the name.
    pub fn into_new_colab(self, owner_id: impl Into<String>) -> Result<NewColab> {
        if is_blank(&self.name) {
            return Err(Error::validation_field("name", "Name is required"));
        }
        let slug = slugify(&self.name);
        if slug.is_empty() {
            return Err(Error::validation_field(
                "name",
                "Name must contain letters or numbers",
            ));
        }
        Ok(NewColab {
            name: self.name.trim().to_string(),
            slug,
            description: trimmed_or_none(self.description.as_deref()),
            readme: self.readme.filter(|r| !is_blank(r)),
            owner_id: owner_id.into(),
            is_public: self.is_public.unwrap_or(true),
            visibility: None,
            forked_from: None,
            tags: parse_tags(&self.tags),
        })
    }
}

/// Checks the free text of a contribution or research note.
///
/// Returns the trimmed text.
pub fn entry_text(field: &str, text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        let label = match field {
            "content" => "Content",
            _ => "Description",
        };
        return Err(Error::validation_field(field, format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}
