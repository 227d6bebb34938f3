//! Queries for the `users` table.

use sqlx::SqliteConnection;

use super::DbError;
use crate::models::User;

/// Get a user by ID.
pub async fn get_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// Insert a user, or move an existing one: username, team and active flag
/// are overwritten when `user_id` already exists.
pub async fn upsert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, username, team_name, is_active)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            username = excluded.username,
            team_name = excluded.team_name,
            is_active = excluded.is_active
        "#,
    )
    .bind(&user.user_id)
    .bind(&user.username)
    .bind(&user.team_name)
    .bind(user.is_active)
    .execute(conn)
    .await?;

    Ok(())
}

/// Set the active flag and return the updated user, or `None` if absent.
pub async fn set_is_active(
    conn: &mut SqliteConnection,
    user_id: &str,
    is_active: bool,
) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET is_active = ?
        WHERE user_id = ?
        RETURNING user_id, username, team_name, is_active
        "#,
    )
    .bind(is_active)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// Deactivate every member of a team.
///
/// # Returns
/// Number of users whose row was updated
pub async fn deactivate_team_members(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<u64, DbError> {
    let result = sqlx::query("UPDATE users SET is_active = 0 WHERE team_name = ?")
        .bind(team_name)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// All active users of a team.
pub async fn active_by_team(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<User>, DbError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ? AND is_active = 1
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(conn)
    .await?;

    Ok(users)
}

/// Return the first of `user_ids` that is missing or inactive, if any.
pub async fn first_inactive(
    conn: &mut SqliteConnection,
    user_ids: &[String],
) -> Result<Option<String>, DbError> {
    for user_id in user_ids {
        let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        if !matches!(active, Some((true,))) {
            return Ok(Some(user_id.clone()));
        }
    }

    Ok(None)
}
