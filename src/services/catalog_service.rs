use crate::entities::service_entity as services;
use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use crate::models::{CreateServiceRequest, ServiceResponse, UpdateServiceRequest};
use crate::services::{can_manage, ensure_manager, find_business};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use validator::Validate;

/// Bookable services offered by businesses.
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// `include_inactive` is honoured for the owner and admins only.
    pub async fn list_for_business(
        &self,
        viewer: Option<CurrentUser>,
        business_id: i64,
        include_inactive: bool,
    ) -> AppResult<Vec<ServiceResponse>> {
        let business = find_business(&self.pool, business_id).await?;
        let manager = can_manage(viewer, &business);
        if !business.is_active && !manager {
            return Err(AppError::NotFound("Business not found".to_string()));
        }

        let mut select = services::Entity::find()
            .filter(services::Column::BusinessId.eq(business.id))
            .order_by_asc(services::Column::Name);
        if !(include_inactive && manager) {
            select = select.filter(services::Column::IsActive.eq(true));
        }

        let list = select.all(&self.pool).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        &self,
        caller: CurrentUser,
        business_id: i64,
        request: CreateServiceRequest,
    ) -> AppResult<ServiceResponse> {
        request.validate()?;
        let business = find_business(&self.pool, business_id).await?;
        ensure_manager(caller, &business)?;

        let now = Utc::now();
        let service = services::ActiveModel {
            business_id: Set(business.id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            price: Set(request.price),
            duration_minutes: Set(request.duration_minutes),
            business_type: Set(business.business_type),
            is_active: Set(true),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Service created: id={} business_id={} price={}",
            service.id,
            service.business_id,
            service.price
        );
        Ok(service.into())
    }

    pub async fn get(&self, viewer: Option<CurrentUser>, id: i64) -> AppResult<ServiceResponse> {
        let service = self.find_service(id).await?;
        if !service.is_active {
            let business = find_business(&self.pool, service.business_id).await?;
            if !can_manage(viewer, &business) {
                return Err(AppError::NotFound("Service not found".to_string()));
            }
        }
        Ok(service.into())
    }

    pub async fn update(
        &self,
        caller: CurrentUser,
        id: i64,
        request: UpdateServiceRequest,
    ) -> AppResult<ServiceResponse> {
        request.validate()?;
        let service = self.find_service(id).await?;
        let business = find_business(&self.pool, service.business_id).await?;
        ensure_manager(caller, &business)?;

        let mut am = service.into_active_model();
        if let Some(v) = request.name {
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = request.description {
            am.description = Set(Some(v));
        }
        if let Some(v) = request.price {
            am.price = Set(v);
        }
        if let Some(v) = request.duration_minutes {
            am.duration_minutes = Set(v);
        }
        if let Some(v) = request.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));

        Ok(am.update(&self.pool).await?.into())
    }

    /// Soft delete.
    pub async fn deactivate(&self, caller: CurrentUser, id: i64) -> AppResult<()> {
        let service = self.find_service(id).await?;
        let business = find_business(&self.pool, service.business_id).await?;
        ensure_manager(caller, &business)?;

        let mut am = service.into_active_model();
        am.is_active = Set(false);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn find_service(&self, id: i64) -> AppResult<services::Model> {
        services::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
    }
}
