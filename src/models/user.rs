use crate::entities::{UserRole, user_entity as users};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Roles open to self-registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegisterRole {
    User,
    #[serde(alias = "provider")]
    Business,
}

impl From<RegisterRole> for UserRole {
    fn from(role: RegisterRole) -> Self {
        match role {
            RegisterRole::User => UserRole::User,
            RegisterRole::Business => UserRole::Business,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub phone: Option<String>,
    /// `user` (default) or `business`
    pub role: Option<RegisterRole>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    /// Matches name or e-mail
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// User as returned by the API; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for UserResponse {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            role: m.role,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

/// `{ success, token, data }` returned by register and login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub data: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Ayşe",
            "email": "ayse@example.com",
            "password": "secret1",
            "role": "provider"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role, Some(RegisterRole::Business));

        let bad = RegisterRequest {
            email: "not-an-email".into(),
            password: "123".into(),
            ..req
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_admin_role_cannot_be_requested() {
        let result = serde_json::from_value::<RegisterRequest>(serde_json::json!({
            "name": "Mallory",
            "email": "m@example.com",
            "password": "secret1",
            "role": "admin"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_response_hides_hash() {
        let model = users::Model {
            id: 1,
            name: "Ali".into(),
            email: "ali@example.com".into(),
            password_hash: "$2b$12$hash".into(),
            phone: None,
            role: UserRole::User,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let value = serde_json::to_value(UserResponse::from(model)).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["isActive"], true);
    }
}
