//! Team lifecycle: creation with members, lookup, and deactivation cascade.

use serde::Serialize;

use crate::db::pool::{self, DbPool};
use crate::db::{pull_requests, teams, users};
use crate::error::AppError;
use crate::models::{Team, TeamMember};
use crate::services::pull_requests::PullRequestService;

/// Outcome of a team deactivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeactivationSummary {
    pub team_name: String,
    pub users_deactivated: u64,
    pub pull_requests_affected: usize,
    pub reviewers_removed: u64,
    pub reviewers_added: usize,
}

#[derive(Debug, Clone)]
pub struct TeamService {
    pool: DbPool,
    pull_requests: PullRequestService,
}

impl TeamService {
    pub fn new(pool: DbPool, pull_requests: PullRequestService) -> Self {
        Self { pool, pull_requests }
    }

    /// Create a team and its members in one transaction.
    ///
    /// Members that already exist are moved into the new team with the
    /// username and active flag given here.
    ///
    /// # Errors
    /// `AlreadyExists` if the team name is taken
    pub async fn create_team(
        &self,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> Result<Team, AppError> {
        let mut tx = pool::begin_write(&self.pool).await?;

        teams::insert_team(&mut tx, team_name).await.map_err(|e| {
            if e.is_unique_violation() {
                AppError::already_exists("Team", team_name)
            } else {
                AppError::from(e)
            }
        })?;

        let count = members.len();
        for member in members {
            users::upsert_user(&mut tx, &member.into_user(team_name)).await?;
        }

        tx.commit().await?;

        log::info!("Team {} created with {} member(s)", team_name, count);

        self.get_team(team_name).await
    }

    /// Get a team and its current members.
    ///
    /// A team without members still exists and comes back with an empty list.
    pub async fn get_team(&self, team_name: &str) -> Result<Team, AppError> {
        let mut conn = self.pool.acquire().await?;

        if !teams::team_exists(&mut conn, team_name).await? {
            return Err(AppError::not_found_with_id("Team", team_name));
        }

        let members = teams::list_members(&mut conn, team_name).await?;

        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    /// Deactivate every member of a team and pull them off open reviews.
    ///
    /// All in one transaction:
    /// 1. Mark every member inactive
    /// 2. Remove the team's members from each open pull request they review
    /// 3. Top up those pull requests from their owning team, unless the
    ///    owning team is the one being deactivated
    pub async fn deactivate_team(&self, team_name: &str) -> Result<DeactivationSummary, AppError> {
        let mut tx = pool::begin_write(&self.pool).await?;

        if !teams::team_exists(&mut tx, team_name).await? {
            return Err(AppError::not_found_with_id("Team", team_name));
        }

        let mut summary = DeactivationSummary {
            team_name: team_name.to_string(),
            ..Default::default()
        };

        summary.users_deactivated = users::deactivate_team_members(&mut tx, team_name).await?;

        let affected = pull_requests::open_with_reviewers_from_team(&mut tx, team_name).await?;
        summary.pull_requests_affected = affected.len();

        for (pull_request_id, reviewers) in &affected {
            summary.reviewers_removed +=
                pull_requests::remove_reviewers(&mut tx, pull_request_id, reviewers).await?;

            let Some(pr) = pull_requests::get_pull_request(&mut tx, pull_request_id).await? else {
                continue;
            };

            // Its own team is now fully inactive.
            if pr.team_name == team_name {
                continue;
            }

            summary.reviewers_added += self
                .pull_requests
                .replenish_reviewers(&mut tx, pull_request_id)
                .await?;
        }

        tx.commit().await?;

        log::info!(
            "Team {} deactivated: {} user(s), {} open pull request(s) touched, {} reviewer(s) removed, {} added",
            team_name,
            summary.users_deactivated,
            summary.pull_requests_affected,
            summary.reviewers_removed,
            summary.reviewers_added
        );

        Ok(summary)
    }
}
