//! Page route guard.
//!
//! Decides, for a page path and whether the visitor has a session, if the
//! page is served or the visitor is redirected.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const PROTECTED_PREFIXES: [&str; 4] = ["/dashboard", "/profile", "/challenges", "/colab/"];
const AUTH_PREFIXES: [&str; 2] = ["/signin", "/signup"];
const UNGUARDED_PREFIXES: [&str; 4] = ["api", "_next/static", "_next/image", "favicon.ico"];

const SIGN_IN_PATH: &str = "/signin";
const HOME_PATH: &str = "/dashboard";

#[allow(clippy::expect_used)]
static IMAGE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:svg|png|jpg|jpeg|gif|webp)$").expect("static image pattern is valid")
});

/// What to do with a page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Serve the page.
    Allow,
    /// Send the visitor to `location`.
    Redirect { location: String },
}

/// Whether the guard looks at `path` at all.
///
/// API routes, framework assets, the favicon, and image files are never
/// guarded.
pub fn is_guarded_path(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if UNGUARDED_PREFIXES.iter().any(|p| rest.starts_with(p)) {
        return false;
    }
    !IMAGE_FILE.is_match(path)
}

/// Decides what happens to a visitor of `path`.
///
/// - no session on a protected page: redirect to `/signin?redirectTo=<path>`,
///   with `path` percent-encoded
/// - session on a sign-in or sign-up page: redirect to `redirect_to`, or
///   `/dashboard` when absent or not a local path
/// - anything else: allow
pub fn route_guard(path: &str, signed_in: bool, redirect_to: Option<&str>) -> GuardDecision {
    if !is_guarded_path(path) {
        return GuardDecision::Allow;
    }

    let is_protected = PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p));
    let is_auth_page = AUTH_PREFIXES.iter().any(|p| path.starts_with(p));

    if !signed_in && is_protected {
        return GuardDecision::Redirect {
            location: format!("{SIGN_IN_PATH}?redirectTo={}", urlencoding::encode(path)),
        };
    }

    if signed_in && is_auth_page {
        let location = redirect_to
            .filter(|target| is_local_path(target))
            .unwrap_or(HOME_PATH);
        return GuardDecision::Redirect {
            location: location.to_string(),
        };
    }

    GuardDecision::Allow
}

/// Same-origin absolute path, never `//host` or a full URL.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
