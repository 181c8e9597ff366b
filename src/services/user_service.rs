use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{Page, PaginationParams, UpdateProfileRequest, UserListQuery, UserResponse};
use crate::services::{like_pattern, paginate};
use crate::utils::{hash_password, normalize_phone, validate_password};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: i64) -> AppResult<UserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    /// Name, phone and password; the password is rehashed.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        request.validate()?;

        let user = self.find_user(user_id).await?;
        let mut am = user.into_active_model();

        if let Some(name) = request.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(phone) = request.phone {
            am.phone = Set(if phone.trim().is_empty() {
                None
            } else {
                Some(normalize_phone(&phone)?)
            });
        }
        if let Some(password) = request.password {
            validate_password(&password)?;
            am.password_hash = Set(hash_password(&password)?);
        }
        am.updated_at = Set(Some(Utc::now()));

        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn list_users(&self, query: &UserListQuery) -> AppResult<Page<UserResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;

        let mut select = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }
        if let Some(pattern) = query.search.as_deref().and_then(like_pattern) {
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Name))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Email))).like(pattern)),
            );
        }

        Ok(paginate(&self.pool, select, params).await?.map(Into::into))
    }

    /// Enable or disable an account. Admins cannot disable themselves.
    pub async fn set_status(
        &self,
        admin_id: i64,
        user_id: i64,
        is_active: bool,
    ) -> AppResult<UserResponse> {
        if admin_id == user_id && !is_active {
            return Err(AppError::ValidationError(
                "You cannot disable your own account".to_string(),
            ));
        }

        let user = self.find_user(user_id).await?;
        if user.is_active == is_active {
            return Ok(user.into());
        }
        let mut am = user.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let user = am.update(&self.pool).await?;

        log::info!("User {user_id} active={is_active} (by admin {admin_id})");
        Ok(user.into())
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
