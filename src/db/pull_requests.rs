//! Queries for `pull_requests` and the `pr_reviewers` join table.

use std::collections::BTreeMap;

use sqlx::SqliteConnection;

use super::DbError;
use crate::models::{PrStatus, PullRequest, PullRequestShort};

/// Insert a new open pull request row (reviewers are inserted separately).
pub async fn insert_pull_request(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    pull_request_name: &str,
    author_id: &str,
    team_name: &str,
    created_at: i64,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, team_name, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(pull_request_id)
    .bind(pull_request_name)
    .bind(author_id)
    .bind(team_name)
    .bind(PrStatus::Open)
    .bind(created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Assign a reviewer to a pull request.
pub async fn insert_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    user_id: &str,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO pr_reviewers (pull_request_id, user_id) VALUES (?, ?)")
        .bind(pull_request_id)
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Get a pull request with its reviewers, or `None` if absent.
pub async fn get_pull_request(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> Result<Option<PullRequest>, DbError> {
    let pr = sqlx::query_as::<_, PullRequest>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, team_name, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut pr) = pr else {
        return Ok(None);
    };

    pr.assigned_reviewers = sqlx::query_scalar(
        "SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY user_id",
    )
    .bind(pull_request_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(pr))
}

/// Current status of a pull request, or `None` if absent.
pub async fn get_status(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> Result<Option<PrStatus>, DbError> {
    let status = sqlx::query_scalar("SELECT status FROM pull_requests WHERE pull_request_id = ?")
        .bind(pull_request_id)
        .fetch_optional(conn)
        .await?;

    Ok(status)
}

/// Transition an open pull request to merged.
///
/// The update is conditional on `status = 'OPEN'`, so a concurrent second
/// merge affects no rows instead of overwriting `merged_at`.
///
/// # Returns
/// `true` if this call performed the transition
pub async fn mark_merged(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    merged_at: i64,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE pull_requests SET status = ?, merged_at = ? WHERE pull_request_id = ? AND status = ?",
    )
    .bind(PrStatus::Merged)
    .bind(merged_at)
    .bind(pull_request_id)
    .bind(PrStatus::Open)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Swap one reviewer for another in a single statement.
///
/// # Returns
/// `false` if `old_reviewer_id` was not assigned (no row matched)
pub async fn replace_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE pr_reviewers SET user_id = ? WHERE pull_request_id = ? AND user_id = ?",
    )
    .bind(new_reviewer_id)
    .bind(pull_request_id)
    .bind(old_reviewer_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Open pull requests that have at least one reviewer from `team_name`.
///
/// # Returns
/// Map of pull request ID to the reviewers from that team
pub async fn open_with_reviewers_from_team(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<BTreeMap<String, Vec<String>>, DbError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT pr.pull_request_id, rev.user_id
        FROM pull_requests pr
        JOIN pr_reviewers rev ON pr.pull_request_id = rev.pull_request_id
        JOIN users u ON rev.user_id = u.user_id
        WHERE pr.status = ? AND u.team_name = ?
        ORDER BY pr.pull_request_id, rev.user_id
        "#,
    )
    .bind(PrStatus::Open)
    .bind(team_name)
    .fetch_all(conn)
    .await?;

    let mut by_pr: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (pull_request_id, user_id) in rows {
        by_pr.entry(pull_request_id).or_default().push(user_id);
    }

    Ok(by_pr)
}

/// Remove the given reviewers from a pull request.
///
/// # Returns
/// Number of assignments removed
pub async fn remove_reviewers(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    user_ids: &[String],
) -> Result<u64, DbError> {
    let mut removed = 0;
    for user_id in user_ids {
        let result = sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND user_id = ?")
            .bind(pull_request_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        removed += result.rows_affected();
    }

    Ok(removed)
}

/// Open pull requests where the user is an assigned reviewer, newest first.
pub async fn open_reviews_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<PullRequestShort>, DbError> {
    let prs = sqlx::query_as::<_, PullRequestShort>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.team_name, pr.status
        FROM pull_requests pr
        JOIN pr_reviewers rev ON pr.pull_request_id = rev.pull_request_id
        WHERE rev.user_id = ? AND pr.status = ?
        ORDER BY pr.created_at DESC, pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .bind(PrStatus::Open)
    .fetch_all(conn)
    .await?;

    Ok(prs)
}
