//! Pull request lifecycle: create, merge, reassign and replenish.
//!
//! Candidate pools are read outside the write transaction. Every choice is
//! then re-checked inside it (status, assignment, active flag) before commit,
//! so a concurrent change makes the operation fail instead of committing an
//! inconsistent reviewer set. Nothing is retried here.

use sqlx::SqliteConnection;

use crate::db::pool::{self, DbPool};
use crate::db::{self, pull_requests, users, DbError};
use crate::error::AppError;
use crate::models::{PrStatus, PullRequest};
use crate::services::reviewer_selection::{ReviewerSelector, MAX_REVIEWERS};

/// Pull request operations backed by the database pool.
#[derive(Debug, Clone)]
pub struct PullRequestService {
    pool: DbPool,
    selector: ReviewerSelector,
}

impl PullRequestService {
    pub fn new(pool: DbPool, selector: ReviewerSelector) -> Self {
        Self { pool, selector }
    }

    /// Get a pull request with its reviewers.
    pub async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut conn = self.pool.acquire().await?;
        pull_requests::get_pull_request(&mut conn, pull_request_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pull_request_id))
    }

    /// Create a pull request and assign up to two reviewers from the author's team.
    ///
    /// The author's current team becomes the pull request's owning team. The
    /// pull request row and its reviewer rows are written in one transaction;
    /// if any selected reviewer is no longer active by then, nothing is kept.
    ///
    /// # Errors
    /// * `NotFound` - the author does not exist
    /// * `AlreadyExists` - the pull request ID is taken
    /// * `InactiveReviewer` - a selected reviewer was deactivated meanwhile
    pub async fn create_pull_request(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        let mut conn = self.pool.acquire().await?;

        let author = users::get_user(&mut conn, author_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Author", author_id))?;

        let teammates: Vec<_> = users::active_by_team(&mut conn, &author.team_name)
            .await?
            .into_iter()
            .filter(|u| u.user_id != author.user_id)
            .collect();
        drop(conn);

        let reviewers = self.selector.select_initial(&teammates);

        let mut tx = pool::begin_write(&self.pool).await?;

        pull_requests::insert_pull_request(
            &mut tx,
            pull_request_id,
            pull_request_name,
            author_id,
            &author.team_name,
            db::now(),
        )
        .await
        .map_err(|e| match e {
            e if e.is_unique_violation() => {
                AppError::already_exists("PullRequest", pull_request_id)
            }
            e if e.is_foreign_key_violation() => AppError::not_found_with_id("Author", author_id),
            e => AppError::from(e),
        })?;

        for reviewer_id in &reviewers {
            pull_requests::insert_reviewer(&mut tx, pull_request_id, reviewer_id)
                .await
                .map_err(|e| reviewer_write_error(e, reviewer_id))?;
        }

        if let Some(inactive) = users::first_inactive(&mut tx, &reviewers).await? {
            return Err(AppError::inactive_reviewer(inactive));
        }

        tx.commit().await?;

        if reviewers.len() < MAX_REVIEWERS {
            log::warn!(
                "Pull request {} created with {} reviewer(s); team {} has no more active candidates",
                pull_request_id,
                reviewers.len(),
                author.team_name
            );
        } else {
            log::info!("Pull request {} created with reviewers {:?}", pull_request_id, reviewers);
        }

        self.get_pull_request(pull_request_id).await
    }

    /// Merge a pull request.
    ///
    /// Idempotent: merging an already merged pull request returns it unchanged.
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut conn = self.pool.acquire().await?;

        let pr = pull_requests::get_pull_request(&mut conn, pull_request_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pull_request_id))?;

        if pr.status == PrStatus::Merged {
            return Ok(pr);
        }

        if pull_requests::mark_merged(&mut conn, pull_request_id, db::now()).await? {
            log::info!("Pull request {} merged", pull_request_id);
        } else {
            log::debug!("Pull request {} was merged concurrently", pull_request_id);
        }

        pull_requests::get_pull_request(&mut conn, pull_request_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pull_request_id))
    }

    /// Replace one reviewer with a random eligible member of the owning team.
    ///
    /// Candidates come from the pull request's owning team, never from the
    /// author's current team, and exclude the author and every reviewer
    /// assigned before the call.
    ///
    /// # Returns
    /// The updated pull request and the new reviewer's ID
    ///
    /// # Errors
    /// * `NotFound` - the pull request does not exist
    /// * `NoCandidate` - nobody eligible is left in the owning team
    /// * `InvalidTransition` - the pull request is merged
    /// * `NotAssigned` - `old_reviewer_id` is not a current reviewer
    /// * `InactiveReviewer` - the chosen replacement was deactivated meanwhile
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<(PullRequest, String), AppError> {
        let mut conn = self.pool.acquire().await?;

        let pr = pull_requests::get_pull_request(&mut conn, pull_request_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pull_request_id))?;

        let active = users::active_by_team(&mut conn, &pr.team_name).await?;
        drop(conn);

        let new_reviewer_id = self
            .selector
            .select_replacements(&active, &pr.author_id, &pr.assigned_reviewers)
            .ok()
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| AppError::no_candidate_for(pull_request_id))?;

        let mut tx = pool::begin_write(&self.pool).await?;

        match pull_requests::get_status(&mut tx, pull_request_id).await? {
            None => return Err(AppError::not_found_with_id("PullRequest", pull_request_id)),
            Some(PrStatus::Merged) => return Err(AppError::pull_request_merged(pull_request_id)),
            Some(PrStatus::Open) => {}
        }

        let replaced = pull_requests::replace_reviewer(
            &mut tx,
            pull_request_id,
            old_reviewer_id,
            &new_reviewer_id,
        )
        .await
        .map_err(|e| match e {
            // The candidate was assigned by someone else since we read the pool.
            e if e.is_unique_violation() => AppError::no_candidate_for(pull_request_id),
            e => reviewer_write_error(e, &new_reviewer_id),
        })?;

        if !replaced {
            return Err(AppError::not_assigned(pull_request_id, old_reviewer_id));
        }

        if let Some(inactive) =
            users::first_inactive(&mut tx, std::slice::from_ref(&new_reviewer_id)).await?
        {
            return Err(AppError::inactive_reviewer(inactive));
        }

        tx.commit().await?;

        log::info!(
            "Pull request {}: reviewer {} replaced by {}",
            pull_request_id,
            old_reviewer_id,
            new_reviewer_id
        );

        let pr = self.get_pull_request(pull_request_id).await?;
        Ok((pr, new_reviewer_id))
    }

    /// Top up an open pull request's reviewers toward [`MAX_REVIEWERS`] from
    /// its owning team.
    ///
    /// Runs on the caller's connection or transaction. Missing, merged or
    /// fully staffed pull requests are left alone, and an empty candidate
    /// pool is not an error.
    ///
    /// # Returns
    /// Number of reviewers added
    pub(crate) async fn replenish_reviewers(
        &self,
        conn: &mut SqliteConnection,
        pull_request_id: &str,
    ) -> Result<usize, AppError> {
        let Some(pr) = pull_requests::get_pull_request(conn, pull_request_id).await? else {
            return Ok(0);
        };

        if !pr.is_open() || pr.assigned_reviewers.len() >= MAX_REVIEWERS {
            return Ok(0);
        }

        let active = users::active_by_team(conn, &pr.team_name).await?;
        let selected = self
            .selector
            .select_replacements(&active, &pr.author_id, &pr.assigned_reviewers);
        let Ok(candidates) = selected else {
            log::debug!(
                "Pull request {} keeps {} reviewer(s): no candidates in team {}",
                pull_request_id,
                pr.assigned_reviewers.len(),
                pr.team_name
            );
            return Ok(0);
        };

        let need = MAX_REVIEWERS - pr.assigned_reviewers.len();
        let mut added = 0;
        for reviewer_id in candidates.iter().take(need) {
            pull_requests::insert_reviewer(conn, pull_request_id, reviewer_id)
                .await
                .map_err(|e| reviewer_write_error(e, reviewer_id))?;
            added += 1;
        }

        Ok(added)
    }
}

/// Translate a failed reviewer-row write.
fn reviewer_write_error(err: DbError, reviewer_id: &str) -> AppError {
    if err.is_foreign_key_violation() {
        AppError::not_found_with_id("User", reviewer_id)
    } else {
        AppError::from(err)
    }
}
