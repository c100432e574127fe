use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to every authenticated account.
pub const USER_ROLE: &str = "user";

/// Role that bypasses ownership checks on posts and comments.
pub const SUPERUSER_ROLE: &str = "superuser";

/// User entity - represents an account that writes posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new regular user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles embedded in this user's access tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![USER_ROLE.to_string()];
        if self.is_superuser {
            roles.push(SUPERUSER_ROLE.to_string());
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_include_superuser_only_when_flagged() {
        let mut user = User::new("mina".into(), "mina@example.com".into(), "hash".into());
        assert_eq!(user.roles(), vec!["user".to_string()]);

        user.is_superuser = true;
        assert_eq!(
            user.roles(),
            vec!["user".to_string(), "superuser".to_string()]
        );
    }
}
