//! Pull request model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// State of a pull request. `Open` moves to `Merged` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// A pull request together with its assigned reviewers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PullRequest {
    pub pull_request_id: String,

    pub pull_request_name: String,

    /// Author's user ID, fixed at creation.
    pub author_id: String,

    /// Owning team: the author's team at creation time, frozen thereafter.
    pub team_name: String,

    pub status: PrStatus,

    /// Creation timestamp (Unix).
    pub created_at: i64,

    /// Merge timestamp (Unix), set iff `status` is `Merged`.
    pub merged_at: Option<i64>,

    /// Reviewer user IDs, loaded separately from `pr_reviewers`.
    #[sqlx(skip)]
    pub assigned_reviewers: Vec<String>,
}

impl PullRequest {
    /// Check if the pull request is open.
    pub fn is_open(&self) -> bool {
        self.status == PrStatus::Open
    }

    /// Check if `user_id` is currently one of the reviewers.
    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }
}

/// Lightweight pull request listing used for review queues.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub team_name: String,
    pub status: PrStatus,
}
