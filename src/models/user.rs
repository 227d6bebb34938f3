//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user belonging to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    /// Owning team; changes when the user is re-listed in another team.
    pub team_name: String,
    pub is_active: bool,
}
