//! Authentication and user types.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{EntityId, impl_entity};

/// A console user (administrator, manager, technician or commercial agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_active() -> bool {
    true
}

impl_entity!(User);

/// Role ladder. Managers inherit technician and commercial rights, and
/// administrators inherit everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Technician,
    Commercial,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Technician,
        UserRole::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Technician => "technician",
            UserRole::Commercial => "commercial",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn is_manager_or_above(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }

    pub fn is_technician_or_above(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::Manager | UserRole::Technician
        )
    }

    pub fn is_commercial_or_above(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::Manager | UserRole::Commercial
        )
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of login and registration.
///
/// Both fields are optional on the wire; a session is only established when
/// the server returns both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl LoginResponse {
    /// The identity and token pair, when the server returned both.
    pub fn credentials(&self) -> Option<(&User, &str)> {
        match (&self.user, &self.access_token) {
            (Some(user), Some(token)) if !token.is_empty() => Some((user, token.as_str())),
            _ => None,
        }
    }
}

/// Payload for `POST /auth/register` and `POST /users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payload for `POST /auth/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Partial profile update applied to the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    /// Shallow-merge the patch into `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(sector) = &self.sector {
            user.sector = Some(sector.clone());
        }
        if let Some(position) = &self.position {
            user.position = Some(position.clone());
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.clone());
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
    }
}

/// Payload for `PATCH /users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Filters for `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Aggregate user counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    #[serde(default)]
    pub by_role: HashMap<String, u64>,
    #[serde(default)]
    pub new_this_month: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role,
            sector: None,
            position: None,
            avatar: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_role_ladder() {
        assert!(UserRole::Admin.is_manager_or_above());
        assert!(UserRole::Admin.is_technician_or_above());
        assert!(UserRole::Admin.is_commercial_or_above());

        assert!(!UserRole::Manager.is_admin());
        assert!(UserRole::Manager.is_technician_or_above());
        assert!(UserRole::Manager.is_commercial_or_above());

        assert!(UserRole::Technician.is_technician_or_above());
        assert!(!UserRole::Technician.is_commercial_or_above());
        assert!(!UserRole::Technician.is_manager_or_above());

        assert!(UserRole::Commercial.is_commercial_or_above());
        assert!(!UserRole::Commercial.is_technician_or_above());
    }

    #[test]
    fn test_role_wire_and_parse() {
        assert_eq!(
            serde_json::to_value(UserRole::Technician).unwrap(),
            serde_json::json!("technician")
        );
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_login_response_credentials() {
        let full = LoginResponse {
            user: Some(user(UserRole::Admin)),
            access_token: Some("tok".to_string()),
            refresh_token: None,
        };
        assert_eq!(full.credentials().map(|(_, t)| t), Some("tok"));

        let missing_user = LoginResponse {
            user: None,
            access_token: Some("tok".to_string()),
            refresh_token: None,
        };
        assert!(missing_user.credentials().is_none());
    }

    #[test]
    fn test_user_patch_apply() {
        let mut u = user(UserRole::Technician);
        UserPatch {
            name: Some("Ana Paula".to_string()),
            role: Some(UserRole::Manager),
            ..Default::default()
        }
        .apply(&mut u);

        assert_eq!(u.name, "Ana Paula");
        assert_eq!(u.role, UserRole::Manager);
        assert_eq!(u.email, "ana@example.com");
    }

    #[test]
    fn test_user_defaults_active() {
        let u: User = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Rui",
            "email": "rui@example.com",
            "role": "commercial"
        }))
        .unwrap();
        assert!(u.is_active);
    }
}
