//! Request and response bodies.

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::models::{PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User};

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddTeamRequest {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Deserialize)]
pub struct TeamNameQuery {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateTeamRequest {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

// ── Responses ────────────────────────────────────────────────────────────────

/// Pull request as returned over HTTP, with RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub team_name: String,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<String>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<String>,
}

impl From<PullRequest> for PullRequestResponse {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            team_name: pr.team_name,
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers,
            created_at: rfc3339(pr.created_at),
            merged_at: pr.merged_at.and_then(rfc3339),
        }
    }
}

/// Format Unix seconds as RFC 3339 UTC, `None` if out of range.
fn rfc3339(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[derive(Debug, Serialize)]
pub struct TeamEnvelope {
    pub team: Team,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct PullRequestEnvelope {
    pub pr: PullRequestResponse,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequestResponse,
    pub replaced_by: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}
