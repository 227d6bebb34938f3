//! Data models for the application.
//!
//! These models represent the entities stored in the SQLite database and
//! returned by the services.
//!
//! All persisted models derive Serialize for the HTTP layer and FromRow for SQLx queries.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{PrStatus, PullRequest, PullRequestShort};
pub use team::{Team, TeamMember};
pub use user::User;
