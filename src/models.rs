use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege level of an identity, checked against route requirements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Lenient parse for trusted sources (database rows, verified token
    /// claims). Unknown tags degrade to the least privileged role.
    pub fn from_str(role: &str) -> Self {
        match role {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    /// Strict parse for untrusted input (route payloads).
    pub fn parse(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// A registered identity as held by the store. The password hash stays
/// inside the store boundary; this type is deliberately not serializable.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Candidate identity handed to `UserStore::create`. The email must
/// already be lowercased and the password already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Mutable profile fields. Email, password, and role are excluded on
/// purpose; each changes only through its dedicated path.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_degrades_unknown_roles() {
        assert_eq!(Role::from_str("admin"), Role::Admin);
        assert_eq!(Role::from_str("user"), Role::User);
        assert_eq!(Role::from_str("superuser"), Role::User);
    }

    #[test]
    fn strict_parse_rejects_unknown_roles() {
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("root"), None);
    }
}
