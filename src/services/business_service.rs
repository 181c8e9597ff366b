use crate::entities::{
    UserRole, business_entity as businesses, service_entity as services, user_entity as users,
    working_hours_entity as working_hours,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use crate::models::{
    BusinessDetailResponse, BusinessListQuery, BusinessResponse, BusinessSort,
    CreateBusinessRequest, Page, PaginationParams, UpdateBusinessRequest,
    UpdateWorkingHoursRequest, WorkingHoursDto,
};
use crate::rules::{DaySchedule, default_week, normalize_week, week_from_rows};
use crate::services::{like_pattern, paginate};
use crate::utils::normalize_phone;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

#[derive(Clone)]
pub struct BusinessService {
    pool: DatabaseConnection,
}

impl BusinessService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        viewer: Option<CurrentUser>,
        query: &BusinessListQuery,
    ) -> AppResult<Page<BusinessResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;

        let mut select = businesses::Entity::find();

        let is_admin = viewer.is_some_and(|v| v.is_admin());
        if !(is_admin && query.include_inactive.unwrap_or(false)) {
            select = select.filter(businesses::Column::IsActive.eq(true));
        }
        if let Some(pattern) = query.location.as_deref().and_then(like_pattern) {
            select = select.filter(
                Condition::any()
                    .add(lower_like(businesses::Column::City, &pattern))
                    .add(lower_like(businesses::Column::District, &pattern))
                    .add(lower_like(businesses::Column::Address, &pattern)),
            );
        }
        if let Some(category) = query.category {
            select = select.filter(businesses::Column::BusinessType.eq(category));
        }
        if let Some(pattern) = query.name.as_deref().and_then(like_pattern) {
            select = select.filter(lower_like(businesses::Column::Name, &pattern));
        }
        if let Some(rating) = query.rating {
            select = select.filter(businesses::Column::AverageRating.gte(rating));
        }

        select = match query.sort.unwrap_or_default() {
            BusinessSort::RatingAsc => select.order_by_asc(businesses::Column::AverageRating),
            BusinessSort::RatingDesc => select
                .order_by_desc(businesses::Column::AverageRating)
                .order_by_desc(businesses::Column::ReviewCount),
            BusinessSort::Name => select.order_by_asc(businesses::Column::Name),
            BusinessSort::Newest => select.order_by_desc(businesses::Column::CreatedAt),
            BusinessSort::Reviews => select.order_by_desc(businesses::Column::ReviewCount),
        }
        .order_by_asc(businesses::Column::Id);

        Ok(paginate(&self.pool, select, params).await?.map(Into::into))
    }

    /// Business of the calling provider.
    pub async fn mine(&self, owner_id: i64) -> AppResult<BusinessDetailResponse> {
        let business = businesses::Entity::find()
            .filter(businesses::Column::OwnerId.eq(owner_id))
            .order_by_asc(businesses::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("You do not have a business yet".to_string()))?;
        self.detail(business, true).await
    }

    /// Inactive businesses are only visible to their owner and admins.
    pub async fn get(
        &self,
        viewer: Option<CurrentUser>,
        id: i64,
    ) -> AppResult<BusinessDetailResponse> {
        let business = self.find_visible(viewer, id).await?;
        let manager = can_manage(viewer, &business);
        self.detail(business, manager).await
    }

    pub async fn create(
        &self,
        caller: CurrentUser,
        request: CreateBusinessRequest,
    ) -> AppResult<BusinessDetailResponse> {
        request.validate()?;
        check_coordinates(request.latitude, request.longitude)?;

        let owner_id = match request.owner_id {
            Some(owner_id) if caller.is_admin() => {
                users::Entity::find_by_id(owner_id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;
                owner_id
            }
            Some(owner_id) if owner_id != caller.id => return Err(AppError::forbidden()),
            _ => caller.id,
        };

        if !caller.is_admin() {
            let existing = businesses::Entity::find()
                .filter(businesses::Column::OwnerId.eq(owner_id))
                .one(&self.pool)
                .await?;
            if existing.is_some() {
                return Err(AppError::Conflict(
                    "You already have a registered business".to_string(),
                ));
            }
        }

        let week = match &request.working_hours {
            Some(days) => parse_week(days)?,
            None => default_week(),
        };
        let phone = optional_phone(request.phone.as_deref())?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let business = businesses::ActiveModel {
            owner_id: Set(owner_id),
            name: Set(request.name.trim().to_string()),
            business_type: Set(request.business_type),
            description: Set(request.description),
            phone: Set(phone),
            email: Set(request.email),
            website: Set(request.website),
            address: Set(request.address),
            city: Set(request.city),
            district: Set(request.district),
            latitude: Set(request.latitude),
            longitude: Set(request.longitude),
            is_active: Set(true),
            average_rating: Set(0.0),
            review_count: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        write_week(&txn, business.id, &week).await?;
        txn.commit().await?;

        log::info!(
            "Business created: id={} owner_id={} type={}",
            business.id,
            business.owner_id,
            business.business_type
        );
        self.detail(business, true).await
    }

    /// `isActive` and `ownerId` may only be changed by admins.
    pub async fn update(
        &self,
        caller: CurrentUser,
        id: i64,
        request: UpdateBusinessRequest,
    ) -> AppResult<BusinessResponse> {
        request.validate()?;
        check_coordinates(request.latitude, request.longitude)?;

        let business = find_business(&self.pool, id).await?;
        ensure_manager(caller, &business)?;
        if request.touches_admin_fields() && !caller.is_admin() {
            return Err(AppError::forbidden());
        }
        if let Some(owner_id) = request.owner_id {
            users::Entity::find_by_id(owner_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;
        }

        let type_change = request
            .business_type
            .filter(|t| *t != business.business_type);
        let mut am = business.into_active_model();
        if let Some(v) = request.name {
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = request.business_type {
            am.business_type = Set(v);
        }
        if let Some(v) = request.description {
            am.description = Set(Some(v));
        }
        if let Some(v) = request.phone {
            am.phone = Set(optional_phone(Some(&v))?);
        }
        if let Some(v) = request.email {
            am.email = Set(Some(v));
        }
        if let Some(v) = request.website {
            am.website = Set(Some(v));
        }
        if let Some(v) = request.address {
            am.address = Set(v);
        }
        if let Some(v) = request.city {
            am.city = Set(v);
        }
        if let Some(v) = request.district {
            am.district = Set(Some(v));
        }
        if let Some(v) = request.latitude {
            am.latitude = Set(Some(v));
        }
        if let Some(v) = request.longitude {
            am.longitude = Set(Some(v));
        }
        if let Some(v) = request.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = request.owner_id {
            am.owner_id = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));

        let txn = self.pool.begin().await?;
        let updated = am.update(&txn).await?;
        // services mirror the business type
        if let Some(new_type) = type_change {
            services::Entity::update_many()
                .set(services::ActiveModel {
                    business_type: Set(new_type),
                    ..Default::default()
                })
                .filter(services::Column::BusinessId.eq(updated.id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(updated.into())
    }

    /// Soft delete.
    pub async fn deactivate(&self, caller: CurrentUser, id: i64) -> AppResult<()> {
        let business = find_business(&self.pool, id).await?;
        ensure_manager(caller, &business)?;

        let mut am = business.into_active_model();
        am.is_active = Set(false);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        log::info!("Business {id} deactivated by user {}", caller.id);
        Ok(())
    }

    pub async fn working_hours(
        &self,
        viewer: Option<CurrentUser>,
        id: i64,
    ) -> AppResult<Vec<WorkingHoursDto>> {
        let business = self.find_visible(viewer, id).await?;
        let rows = load_hours(&self.pool, business.id).await?;
        Ok(week_from_rows(&rows).iter().map(Into::into).collect())
    }

    /// Replace the whole week; days not supplied become closed.
    pub async fn replace_working_hours(
        &self,
        caller: CurrentUser,
        id: i64,
        request: UpdateWorkingHoursRequest,
    ) -> AppResult<Vec<WorkingHoursDto>> {
        request.validate()?;
        let business = find_business(&self.pool, id).await?;
        ensure_manager(caller, &business)?;

        let week = parse_week(&request.working_hours)?;

        let txn = self.pool.begin().await?;
        working_hours::Entity::delete_many()
            .filter(working_hours::Column::BusinessId.eq(business.id))
            .exec(&txn)
            .await?;
        write_week(&txn, business.id, &week).await?;
        txn.commit().await?;

        Ok(week.iter().map(Into::into).collect())
    }

    async fn find_visible(
        &self,
        viewer: Option<CurrentUser>,
        id: i64,
    ) -> AppResult<businesses::Model> {
        let business = find_business(&self.pool, id).await?;
        if !business.is_active && !can_manage(viewer, &business) {
            return Err(AppError::NotFound("Business not found".to_string()));
        }
        Ok(business)
    }

    async fn detail(
        &self,
        business: businesses::Model,
        include_inactive_services: bool,
    ) -> AppResult<BusinessDetailResponse> {
        let rows = load_hours(&self.pool, business.id).await?;

        let mut select = services::Entity::find()
            .filter(services::Column::BusinessId.eq(business.id))
            .order_by_asc(services::Column::Name);
        if !include_inactive_services {
            select = select.filter(services::Column::IsActive.eq(true));
        }
        let service_list = select.all(&self.pool).await?;

        Ok(BusinessDetailResponse {
            business: business.into(),
            working_hours: week_from_rows(&rows).iter().map(Into::into).collect(),
            services: service_list.into_iter().map(Into::into).collect(),
        })
    }
}

pub(crate) async fn find_business<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> AppResult<businesses::Model> {
    businesses::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))
}

pub(crate) async fn load_hours<C: ConnectionTrait>(
    db: &C,
    business_id: i64,
) -> AppResult<Vec<working_hours::Model>> {
    Ok(working_hours::Entity::find()
        .filter(working_hours::Column::BusinessId.eq(business_id))
        .all(db)
        .await?)
}

/// Owner of `business` or an admin.
pub(crate) fn can_manage(viewer: Option<CurrentUser>, business: &businesses::Model) -> bool {
    match viewer {
        Some(v) => v.role == UserRole::Admin || v.id == business.owner_id,
        None => false,
    }
}

pub(crate) fn ensure_manager(caller: CurrentUser, business: &businesses::Model) -> AppResult<()> {
    if can_manage(Some(caller), business) {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

fn lower_like(column: businesses::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

fn parse_week(days: &[WorkingHoursDto]) -> AppResult<Vec<DaySchedule>> {
    let parsed = days
        .iter()
        .map(|d| {
            DaySchedule::parse(
                d.day_of_week,
                d.is_open,
                d.open_time.as_deref(),
                d.close_time.as_deref(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_week(parsed)?)
}

async fn write_week<C: ConnectionTrait>(
    db: &C,
    business_id: i64,
    week: &[DaySchedule],
) -> AppResult<()> {
    let rows = week.iter().map(|d| working_hours::ActiveModel {
        business_id: Set(business_id),
        day_of_week: Set(d.day),
        is_open: Set(d.is_open),
        open_time: Set(d.open_time()),
        close_time: Set(d.close_time()),
        ..Default::default()
    });
    working_hours::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

fn optional_phone(phone: Option<&str>) -> AppResult<Option<String>> {
    phone
        .filter(|p| !p.trim().is_empty())
        .map(normalize_phone)
        .transpose()
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if latitude.is_some_and(|v| !(-90.0..=90.0).contains(&v)) {
        return Err(AppError::ValidationError(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if longitude.is_some_and(|v| !(-180.0..=180.0).contains(&v)) {
        return Err(AppError::ValidationError(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BusinessType, Weekday};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn business(owner_id: i64) -> businesses::Model {
        businesses::Model {
            id: 1,
            owner_id,
            name: "Köpük".into(),
            business_type: BusinessType::CarWash,
            description: None,
            phone: None,
            email: None,
            website: None,
            address: "Bağdat Cad. 12".into(),
            city: "İstanbul".into(),
            district: None,
            latitude: None,
            longitude: None,
            is_active: true,
            average_rating: 0.0,
            review_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_can_manage() {
        let b = business(7);
        let owner = CurrentUser { id: 7, role: UserRole::Business };
        let other = CurrentUser { id: 8, role: UserRole::Business };
        let admin = CurrentUser { id: 1, role: UserRole::Admin };
        assert!(can_manage(Some(owner), &b));
        assert!(!can_manage(Some(other), &b));
        assert!(can_manage(Some(admin), &b));
        assert!(!can_manage(None, &b));
        assert!(ensure_manager(other, &b).is_err());
    }

    #[test]
    fn test_parse_week_fills_gaps() {
        let week = parse_week(&[WorkingHoursDto {
            day_of_week: Weekday::Saturday,
            is_open: true,
            open_time: Some("10:00".into()),
            close_time: Some("14:00".into()),
        }])
        .unwrap();
        assert_eq!(week.len(), 7);
        assert!(week.iter().filter(|d| d.is_open).count() == 1);
        assert_eq!(week[5].open_time().as_deref(), Some("10:00"));

        let bad = parse_week(&[WorkingHoursDto {
            day_of_week: Weekday::Monday,
            is_open: true,
            open_time: Some("18:00".into()),
            close_time: Some("09:00".into()),
        }]);
        assert!(matches!(bad, Err(AppError::Schedule(_))));
    }

    #[test]
    fn test_check_coordinates() {
        assert!(check_coordinates(Some(41.0), Some(29.0)).is_ok());
        assert!(check_coordinates(None, None).is_ok());
        assert!(check_coordinates(Some(91.0), None).is_err());
        assert!(check_coordinates(None, Some(-181.0)).is_err());
    }

    fn hours_row(id: i64, day: Weekday, open: Option<(&str, &str)>) -> working_hours::Model {
        working_hours::Model {
            id,
            business_id: 1,
            day_of_week: day,
            is_open: open.is_some(),
            open_time: open.map(|(o, _)| o.to_string()),
            close_time: open.map(|(_, c)| c.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_writes_default_week() {
        // stored rows come back unordered
        let mut stored = vec![hours_row(7, Weekday::Sunday, None)];
        for (i, day) in Weekday::ALL[..6].iter().enumerate() {
            stored.push(hours_row(i as i64 + 1, *day, Some(("09:00", "18:00"))));
        }

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<businesses::Model>::new(), vec![business(7)]])
            .append_query_results([vec![hours_row(7, Weekday::Sunday, None)], stored])
            .append_query_results([Vec::<services::Model>::new()])
            .into_connection();
        let service = BusinessService::new(db.clone());

        let request: CreateBusinessRequest = serde_json::from_value(serde_json::json!({
            "name": "Köpük",
            "businessType": "car-wash",
            "address": "Bağdat Cad. 12",
            "city": "İstanbul"
        }))
        .unwrap();
        let caller = CurrentUser { id: 7, role: UserRole::Business };
        let detail = service.create(caller, request).await.unwrap();

        assert_eq!(detail.working_hours.len(), 7);
        assert_eq!(detail.working_hours[0].day_of_week, Weekday::Monday);
        for day in &detail.working_hours[..6] {
            assert!(day.is_open);
            assert_eq!(day.open_time.as_deref(), Some("09:00"));
            assert_eq!(day.close_time.as_deref(), Some("18:00"));
        }
        assert_eq!(detail.working_hours[6].day_of_week, Weekday::Sunday);
        assert!(!detail.working_hours[6].is_open);

        drop(service);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("INSERT INTO \\\"working_hours\\\""));
        assert_eq!(log.matches("\"09:00\"").count(), 6);
        assert_eq!(log.matches("\"18:00\"").count(), 6);
        assert!(log.contains("COMMIT"));
    }
}
