//! Team model.
//!
//! A team has no attributes beyond its name. Membership is derived from the
//! users whose `team_name` matches.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::User;

/// A team member as listed when creating a team or reading it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Turn this listing into a user row owned by `team_name`.
    pub fn into_user(self, team_name: &str) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name: team_name.to_string(),
            is_active: self.is_active,
        }
    }
}

/// A team with its current members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_into_user_takes_team() {
        let member = TeamMember {
            user_id: "u1".into(),
            username: "Alice".into(),
            is_active: false,
        };

        let user = member.into_user("payments");
        assert_eq!(user.team_name, "payments");
        assert_eq!(user.user_id, "u1");
        assert!(!user.is_active);
    }
}
