//! Store staff accounts.

use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, require};
use crate::listing::{Listable, SortKey, any_contains};
use crate::types::{Email, UserId, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl Listable for StoreUser {
    fn matches(&self, needle: &str) -> bool {
        any_contains(needle, [Some(self.name.as_str()), Some(self.email.as_str())])
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.to_lowercase())),
            "role" => Some(SortKey::Text(self.role.as_str().to_string())),
            _ => None,
        }
    }
}

/// The signed-in user, from `/auth/current_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    /// Subdomain of the store the user manages.
    #[serde(default, alias = "subdomain")]
    pub tenant: Option<String>,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Initials for the avatar badge.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Invite form for a new staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserInput {
    /// # Errors
    ///
    /// Rejects blank names, malformed emails and the super-admin role.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Name", &self.name)?;
        Email::parse(&self.email).map_err(|e| ValidationError::invalid("Email", e.to_string()))?;
        if self.role.is_super_admin() {
            return Err(ValidationError::invalid("Role", "cannot be assigned from a store"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user() {
        let user: CurrentUser = serde_json::from_str(
            r#"{"id":"u1","name":"sita devi","email":"s@acme.com","role":"super_admin","subdomain":"acme"}"#,
        )
        .unwrap();
        assert!(user.is_super_admin());
        assert_eq!(user.initials(), "SD");
        assert_eq!(user.tenant.as_deref(), Some("acme"));
    }

    #[test]
    fn test_invite_validation() {
        let mut input = UserInput {
            name: "Ram".into(),
            email: "ram@acme.com".into(),
            role: UserRole::Admin,
        };
        assert!(input.validate().is_ok());
        input.role = UserRole::SuperAdmin;
        assert!(input.validate().is_err());
        input.role = UserRole::Staff;
        input.email = "ram".into();
        assert!(input.validate().is_err());
    }
}
