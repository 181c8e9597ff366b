use crate::entities::{
    AppointmentStatus, appointment_entity as appointments, business_entity as businesses,
    coupon_entity as coupons, review_entity as reviews, service_entity as services,
    user_entity as users,
};
use crate::error::AppResult;
use crate::models::{AdminStatsResponse, AppointmentStatusCounts};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
}

impl AdminService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> AppResult<AdminStatsResponse> {
        let db = &self.pool;

        let total_users = users::Entity::find().count(db).await?;
        let active_users = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let total_businesses = businesses::Entity::find().count(db).await?;
        let active_businesses = businesses::Entity::find()
            .filter(businesses::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let total_services = services::Entity::find()
            .filter(services::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let total_appointments = appointments::Entity::find().count(db).await?;

        let by_status = |status: AppointmentStatus| {
            appointments::Entity::find()
                .filter(appointments::Column::Status.eq(status))
                .count(db)
        };
        let appointments_by_status = AppointmentStatusCounts {
            pending: by_status(AppointmentStatus::Pending).await?,
            confirmed: by_status(AppointmentStatus::Confirmed).await?,
            completed: by_status(AppointmentStatus::Completed).await?,
            cancelled: by_status(AppointmentStatus::Cancelled).await?,
        };

        let pending_reviews = reviews::Entity::find()
            .filter(reviews::Column::IsApproved.eq(false))
            .filter(reviews::Column::DeletedAt.is_null())
            .count(db)
            .await?;
        let active_coupons = coupons::Entity::find()
            .filter(coupons::Column::IsActive.eq(true))
            .count(db)
            .await?;

        Ok(AdminStatsResponse {
            total_users,
            active_users,
            total_businesses,
            active_businesses,
            total_services,
            total_appointments,
            appointments_by_status,
            pending_reviews,
            active_coupons,
        })
    }
}
