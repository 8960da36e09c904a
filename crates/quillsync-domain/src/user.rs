//! Users as the transition engine sees them: identity, roles, creation window.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role that opts a user into repeated transition scheduling.
pub const TRANSITION_USER_ROLE: &str = "TRANSITION_USER";

/// A backend user. Created and mutated elsewhere; this core only reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uuid: Uuid,
    pub roles: Vec<String>,
    /// UTC microseconds.
    pub created_at: i64,
    /// UTC microseconds.
    pub updated_at: i64,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|candidate| candidate == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_lookup() {
        let user = User {
            uuid: Uuid::new_v4(),
            roles: vec!["BASIC_USER".to_string(), TRANSITION_USER_ROLE.to_string()],
            created_at: 0,
            updated_at: 0,
        };
        assert!(user.has_role(TRANSITION_USER_ROLE));
        assert!(!user.has_role("ADMIN"));
    }
}
