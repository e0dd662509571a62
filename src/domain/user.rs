//! User identity types referenced by access keys.
//!
//! User management itself lives in an external service; this crate only
//! needs the owner's identity and role.

use serde::{Deserialize, Serialize};

/// Identifier of a key-owning user
pub type UserId = i64;

/// Role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    Client,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A user as seen by the access key engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub role: UserRole,
}

impl User {
    pub fn new(id: UserId, login: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            login: login.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let admin = User::new(1, "root", UserRole::Admin);
        let client = User::new(2, "device-owner", UserRole::Client);

        assert!(admin.is_admin());
        assert!(!client.is_admin());
    }
}
