//! Authenticated identity supplied by the auth collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// The identity the core trusts for authorization checks: who the caller
/// is, their role, and the branches they are assigned to. Token issuance
/// happens outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role name.
    pub role: String,
    /// Branch IDs the user is assigned to.
    #[serde(default)]
    pub branches: Vec<Uuid>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, branches: Vec<Uuid>, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            branches,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns true if the user is assigned to the given branch.
    #[must_use]
    pub fn is_assigned_to(&self, branch_id: Uuid) -> bool {
        self.branches.contains(&branch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_assigned_to() {
        let branch = Uuid::new_v4();
        let other = Uuid::new_v4();
        let claims = Claims::new(
            Uuid::new_v4(),
            "accountant",
            vec![branch],
            Utc::now() + chrono::Duration::minutes(15),
        );

        assert!(claims.is_assigned_to(branch));
        assert!(!claims.is_assigned_to(other));
    }
}
