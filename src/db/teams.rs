//! Queries for the `teams` table and derived membership.

use sqlx::SqliteConnection;

use super::DbError;
use crate::models::TeamMember;

/// Insert a new team row. Fails with a unique violation if the name is taken.
pub async fn insert_team(conn: &mut SqliteConnection, team_name: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
        .bind(team_name)
        .execute(conn)
        .await?;

    Ok(())
}

/// Check whether a team row exists.
pub async fn team_exists(conn: &mut SqliteConnection, team_name: &str) -> Result<bool, DbError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(conn)
        .await?;

    Ok(row.is_some())
}

/// Current members of a team, ordered by user ID.
pub async fn list_members(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<TeamMember>, DbError> {
    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT user_id, username, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(conn)
    .await?;

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_team, setup_test_db};

    #[tokio::test]
    async fn test_insert_and_exists() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        assert!(!team_exists(&mut conn, "backend").await.unwrap());
        insert_team(&mut conn, "backend").await.unwrap();
        assert!(team_exists(&mut conn, "backend").await.unwrap());

        let err = insert_team(&mut conn, "backend").await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_list_members() {
        let pool = setup_test_db().await;
        seed_team(&pool, "backend", &[("u2", false), ("u1", true)]).await;
        seed_team(&pool, "frontend", &[("u3", true)]).await;

        let mut conn = pool.acquire().await.unwrap();
        let members = list_members(&mut conn, "backend").await.unwrap();

        let ids: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(members[0].is_active);
        assert!(!members[1].is_active);
    }
}
