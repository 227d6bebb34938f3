//! HTTP API.
//!
//! JSON endpoints over the team, user and pull request services. Handlers
//! only parse, validate and shape responses; all decisions live in the
//! services.

mod handlers;
mod types;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::services::{PullRequestService, ReviewerSelector, TeamService, UserService};

pub use types::PullRequestResponse;

/// Shared state for the axum routes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
}

impl AppState {
    /// Wire the services over one pool, sharing a single reviewer selector.
    pub fn new(pool: DbPool, selector: ReviewerSelector) -> Self {
        let pull_requests = PullRequestService::new(pool.clone(), selector);
        Self {
            teams: TeamService::new(pool.clone(), pull_requests.clone()),
            users: UserService::new(pool),
            pull_requests,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/team/add", post(handlers::add_team))
        .route("/team/get", get(handlers::get_team))
        .route("/team/deactivate", post(handlers::deactivate_team))
        .route("/users/setIsActive", post(handlers::set_is_active))
        .route("/users/getReview", get(handlers::get_review))
        .route("/pullRequest/create", post(handlers::create_pull_request))
        .route("/pullRequest/merge", post(handlers::merge_pull_request))
        .route("/pullRequest/reassign", post(handlers::reassign_reviewer))
        .with_state(state)
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Wrapper to make AppError usable as an axum error response.
struct ApiErr(AppError);

impl ApiErr {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::AlreadyExists { resource, .. } if resource == "Team" => {
                (StatusCode::BAD_REQUEST, "TEAM_EXISTS")
            }
            AppError::AlreadyExists { .. } => (StatusCode::CONFLICT, "PR_EXISTS"),
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, "PR_MERGED"),
            AppError::NotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
            AppError::NoCandidate { .. } => (StatusCode::CONFLICT, "NO_CANDIDATE"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InactiveReviewer { .. } => (StatusCode::BAD_REQUEST, "INACTIVE_REVIEWER"),
            AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::Database { .. } | AppError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Storage details stay in the log.
        let message = if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid query string: {}",
            rejection.body_text()
        )))
    }
}
