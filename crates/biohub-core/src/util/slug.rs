//! URL slug utilities.
//!
//! Colab pages are addressed by slug (`/colab/<slug>`). Slugs are derived
//! from the colab name when it is created, and forks get a time-stamped
//! variant of the original slug so they never collide with it.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static NON_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("static slug pattern is valid")
});

/// Derive a URL slug from a display name.
///
/// 1. Converts to lowercase
/// 2. Replaces every run of characters outside `[a-z0-9]` with one hyphen
/// 3. Strips leading and trailing hyphens
///
/// # Examples
///
/// ```
/// use biohub_core::util::slug::slugify;
///
/// assert_eq!(slugify("CRISPR Screen: Round 2"), "crispr-screen-round-2");
/// assert_eq!(slugify("  --Tumor   Micro-Environment--  "), "tumor-micro-environment");
/// assert_eq!(slugify("Ünïcode"), "n-code");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Slug for a fork of the colab at `slug`, stamped with `millis` since the epoch.
///
/// ```
/// use biohub_core::util::slug::fork_slug;
///
/// assert_eq!(fork_slug("crispr-screen", 1700000000000), "crispr-screen-fork-1700000000000");
/// ```
pub fn fork_slug(slug: &str, millis: i64) -> String {
    format!("{slug}-fork-{millis}")
}

/// Display name for a fork of the colab called `name`.
pub fn fork_name(name: &str) -> String {
    format!("{name} (Fork)")
}
