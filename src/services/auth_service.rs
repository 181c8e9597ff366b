use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UserResponse,
};
use crate::utils::{JwtService, hash_password, normalize_phone, validate_password, verify_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use validator::Validate;

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// Create an account and sign it in. Admin accounts cannot self-register.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;
        validate_password(&request.password)?;

        let email = normalize_email(&request.email);
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let phone = request
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(normalize_phone)
            .transpose()?;
        let role: UserRole = request.role.map(Into::into).unwrap_or(UserRole::User);
        let now = Utc::now();

        let user = users::ActiveModel {
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(hash_password(&request.password)?),
            phone: Set(phone),
            role: Set(role),
            is_active: Set(true),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("User registered: id={} role={}", user.id, user.role);
        self.issue(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(&request.email)))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        log::info!("User logged in: id={}", user.id);
        self.issue(user)
    }

    pub async fn me(&self, user_id: i64) -> AppResult<UserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        request.validate()?;
        validate_password(&request.new_password)?;

        let user = self.find_user(user_id).await?;
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut am = user.into_active_model();
        am.password_hash = Set(hash_password(&request.new_password)?);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        log::info!("Password changed: user_id={user_id}");
        Ok(())
    }

    fn issue(&self, user: users::Model) -> AppResult<AuthResponse> {
        let token = self.jwt_service.generate_token(user.id, user.role)?;
        Ok(AuthResponse {
            success: true,
            token,
            data: user.into(),
        })
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid email or password".to_string())
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ayse@Example.COM "), "ayse@example.com");
    }
}
