//! User operations outside team creation.

use crate::db::pool::DbPool;
use crate::db::{pull_requests, users};
use crate::error::AppError;
use crate::models::{PullRequestShort, User};

#[derive(Debug, Clone)]
pub struct UserService {
    pool: DbPool,
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Flip a single user's active flag.
    ///
    /// Existing review assignments are kept; only team deactivation pulls
    /// reviewers off open pull requests.
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let mut conn = self.pool.acquire().await?;

        let user = users::set_is_active(&mut conn, user_id, is_active)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", user_id))?;

        log::info!("User {} is_active set to {}", user_id, is_active);
        Ok(user)
    }

    /// Open pull requests the user is reviewing, newest first.
    pub async fn get_reviews(&self, user_id: &str) -> Result<Vec<PullRequestShort>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(pull_requests::open_reviews_for_user(&mut conn, user_id).await?)
    }
}
