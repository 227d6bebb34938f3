//! Review Roster - pull request reviewer assignment service.
//!
//! Teams own users; pull requests get up to two reviewers drawn at random
//! from the author's team, and keep that owning team for later
//! reassignments. State lives in SQLite; the HTTP API is served by axum.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
