use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
}

impl Vocabulary for Role {
    const ALL: &'static [Self] = &[Self::Admin, Self::Manager];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Active,
    Suspended,
    Deleted,
}

impl Vocabulary for AdminStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Suspended, Self::Deleted];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }
}

/// Stored admin account. `password` holds the bcrypt hash and never leaves
/// the server; responses use [`AdminProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub status: AdminStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: AdminStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
            full_name: admin.full_name.clone(),
            role: admin.role,
            status: admin.status,
            avatar: admin.avatar.clone(),
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_hides_password() {
        let now = Utc::now();
        let admin = Admin {
            id: "a".repeat(24),
            email: "ada@example.com".to_string(),
            password: "$2b$10$hash".to_string(),
            full_name: "Ada".to_string(),
            role: Role::Manager,
            status: AdminStatus::Active,
            avatar: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(AdminProfile::from(&admin)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Ada");
        assert_eq!(json["role"], "manager");
        assert!(json.get("avatar").is_none());
    }
}
