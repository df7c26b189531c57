//! Utility functions shared across BioHub crates.
//!
//! - [`slug`]: URL slugs for colabs and their forks
//! - [`tags`]: comma-separated tag parsing

pub mod slug;
pub mod tags;
