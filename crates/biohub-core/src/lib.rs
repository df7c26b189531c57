//! BioHub Core: records, validation, configuration, and errors.
//!
//! This crate has no internal BioHub dependencies. Everything that talks to
//! the network lives in `biohub-store`, `biohub-auth`, and `biohub-ai`.
//!
//! # Modules
//!
//! - [`model`]: rows of the hosted database
//! - [`validate`]: form rules and normalization
//! - [`listing`]: challenge search and pagination
//! - [`quota`]: monthly AI prompt allowance
//! - [`config`]: layered configuration
//! - [`util`]: slugs and tag lists

#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod listing;
pub mod model;
pub mod quota;
pub mod util;
pub mod validate;

pub use config::{BiohubConfig, ConfigManager, StoreBackend};
pub use error::{Error, FieldErrors, Result};
pub use listing::{CHALLENGES_PER_PAGE, ChallengeQuery, DASHBOARD_LIMIT, Page, paginate};
pub use quota::{MONTHLY_PROMPT_LIMIT, PromptQuota};
pub use util::slug::{fork_name, fork_slug, slugify};
pub use util::tags::parse_tags;
