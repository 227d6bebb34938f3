//! Route handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::types::{
    AddTeamRequest, CreatePullRequestRequest, DeactivateTeamRequest, MergePullRequestRequest,
    PullRequestEnvelope, ReassignRequest, ReassignResponse, ReviewsResponse, SetIsActiveRequest,
    TeamEnvelope, TeamNameQuery, UserEnvelope, UserIdQuery,
};
use super::{ApiErr, AppState};
use crate::error::AppError;
use crate::models::Team;

/// Reject empty or whitespace-only required fields.
fn require(field: &str, value: &str) -> Result<(), ApiErr> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(format!("{} is required", field), field).into());
    }
    Ok(())
}

// ── Teams ────────────────────────────────────────────────────────────────────

/// POST /team/add: create a team with its members.
pub(super) async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<AddTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(req) = payload?;
    require("team_name", &req.team_name)?;
    for member in &req.members {
        require("user_id", &member.user_id)?;
    }

    let team = state.teams.create_team(&req.team_name, req.members).await?;
    Ok((StatusCode::CREATED, Json(TeamEnvelope { team })))
}

/// GET /team/get?team_name=: a team and its members.
pub(super) async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamNameQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(query) = query?;
    require("team_name", &query.team_name)?;

    Ok(Json(state.teams.get_team(&query.team_name).await?))
}

/// POST /team/deactivate: deactivate a team and reshuffle its open reviews.
pub(super) async fn deactivate_team(
    State(state): State<AppState>,
    payload: Result<Json<DeactivateTeamRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiErr> {
    let Json(req) = payload?;
    require("team_name", &req.team_name)?;

    let summary = state.teams.deactivate_team(&req.team_name).await?;
    Ok(Json(json!({
        "message": "team deactivated successfully",
        "summary": summary,
    })))
}

// ── Users ────────────────────────────────────────────────────────────────────

/// POST /users/setIsActive
pub(super) async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(req) = payload?;
    require("user_id", &req.user_id)?;

    let user = state.users.set_is_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserEnvelope { user }))
}

/// GET /users/getReview?user_id=: open pull requests the user reviews.
pub(super) async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<ReviewsResponse>, ApiErr> {
    let Query(query) = query?;
    require("user_id", &query.user_id)?;

    let pull_requests = state.users.get_reviews(&query.user_id).await?;
    Ok(Json(ReviewsResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}

// ── Pull requests ────────────────────────────────────────────────────────────

/// POST /pullRequest/create
pub(super) async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestEnvelope>), ApiErr> {
    let Json(req) = payload?;
    require("pull_request_id", &req.pull_request_id)?;
    require("pull_request_name", &req.pull_request_name)?;
    require("author_id", &req.author_id)?;

    let pr = state
        .pull_requests
        .create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestEnvelope { pr: pr.into() })))
}

/// POST /pullRequest/merge
pub(super) async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestEnvelope>, ApiErr> {
    let Json(req) = payload?;
    require("pull_request_id", &req.pull_request_id)?;

    let pr = state.pull_requests.merge_pull_request(&req.pull_request_id).await?;
    Ok(Json(PullRequestEnvelope { pr: pr.into() }))
}

/// POST /pullRequest/reassign
pub(super) async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let Json(req) = payload?;
    require("pull_request_id", &req.pull_request_id)?;
    require("old_user_id", &req.old_user_id)?;

    let (pr, replaced_by) = state
        .pull_requests
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;

    Ok(Json(ReassignResponse {
        pr: pr.into(),
        replaced_by,
    }))
}
