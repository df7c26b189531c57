//! BioHub API: the JSON HTTP surface.
//!
//! # Modules
//!
//! - [`routes`]: handlers and the route table
//! - [`state`]: [`AppState`], shared by every handler
//! - [`extract`]: [`CurrentUser`] and [`JsonBody`] extractors
//! - [`view`]: response shapes composed from several rows
//! - [`server`]: [`Server`], middleware stack and graceful shutdown
//! - [`error`]: [`ApiError`] and its JSON rendering

#![doc = include_str!("../README.md")]

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;
pub mod view;

pub use error::{ApiError, Result};
pub use extract::{CurrentUser, JsonBody};
pub use routes::router;
pub use server::{Server, shutdown_signal};
pub use state::AppState;
