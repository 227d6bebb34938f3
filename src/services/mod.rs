//! Business logic services.
//!
//! Each service owns a pool handle and runs its own transactions. Only
//! reviewer replenishment runs on a caller-supplied connection, so team
//! deactivation can invoke it inside its cascade.

pub mod pull_requests;
pub mod reviewer_selection;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestService;
pub use reviewer_selection::{RandomSource, ReviewerSelector, SecureRandom, SeededRandom};
pub use teams::{DeactivationSummary, TeamService};
pub use users::UserService;
