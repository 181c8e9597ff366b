use crate::entities::{
    AppointmentStatus, NotificationType, appointment_entity as appointments,
    business_entity as businesses, review_entity as reviews,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use crate::models::{
    CreateReviewRequest, Page, PaginationParams, ReplyReviewRequest, ReviewListQuery,
    ReviewResponse,
};
use crate::services::{
    NewNotification, NotificationService, can_manage, ensure_manager, find_business, paginate,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use validator::Validate;

#[derive(Clone)]
pub struct ReviewService {
    pool: DatabaseConnection,
    notifications: NotificationService,
}

impl ReviewService {
    pub fn new(pool: DatabaseConnection, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Approved reviews; the owner and admins may include pending ones.
    pub async fn list_for_business(
        &self,
        viewer: Option<CurrentUser>,
        business_id: i64,
        query: &ReviewListQuery,
    ) -> AppResult<Page<ReviewResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;
        let business = find_business(&self.pool, business_id).await?;
        let manager = can_manage(viewer, &business);
        if !business.is_active && !manager {
            return Err(AppError::NotFound("Business not found".to_string()));
        }

        let mut select = reviews::Entity::find()
            .filter(reviews::Column::BusinessId.eq(business.id))
            .filter(reviews::Column::DeletedAt.is_null())
            .order_by_desc(reviews::Column::CreatedAt)
            .order_by_desc(reviews::Column::Id);
        if !(manager && query.include_pending.unwrap_or(false)) {
            select = select.filter(reviews::Column::IsApproved.eq(true));
        }

        Ok(paginate(&self.pool, select, params).await?.map(Into::into))
    }

    /// One live review per user and business, after a completed appointment.
    pub async fn create(
        &self,
        caller: CurrentUser,
        business_id: i64,
        request: CreateReviewRequest,
    ) -> AppResult<ReviewResponse> {
        request.validate()?;
        let business = find_business(&self.pool, business_id).await?;
        if !business.is_active {
            return Err(AppError::NotFound("Business not found".to_string()));
        }

        let existing = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(caller.id))
            .filter(reviews::Column::BusinessId.eq(business.id))
            .filter(reviews::Column::DeletedAt.is_null())
            .count(&self.pool)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict(
                "You have already reviewed this business".to_string(),
            ));
        }

        let mut completed = appointments::Entity::find()
            .filter(appointments::Column::UserId.eq(caller.id))
            .filter(appointments::Column::BusinessId.eq(business.id))
            .filter(appointments::Column::Status.eq(AppointmentStatus::Completed));
        if let Some(appointment_id) = request.appointment_id {
            completed = completed.filter(appointments::Column::Id.eq(appointment_id));
        }
        let appointment = completed
            .order_by_desc(appointments::Column::AppointmentDate)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "You can only review a business after a completed appointment".to_string(),
                )
            })?;

        let now = Utc::now();
        let review = reviews::ActiveModel {
            user_id: Set(caller.id),
            business_id: Set(business.id),
            appointment_id: Set(Some(appointment.id)),
            rating: Set(request.rating),
            comment: Set(request.comment),
            reply: Set(None),
            is_approved: Set(false),
            deleted_at: Set(None),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.notifications.spawn_notify(
            vec![business.owner_id],
            NewNotification {
                title: "New review".to_string(),
                message: format!("{} received a {}-star review", business.name, review.rating),
                notification_type: NotificationType::Review,
                related_id: Some(review.id),
            },
            false,
        );

        Ok(review.into())
    }

    pub async fn approve(&self, id: i64) -> AppResult<ReviewResponse> {
        let review = self.find_live(id).await?;
        if review.is_approved {
            return Ok(review.into());
        }

        let txn = self.pool.begin().await?;
        let mut am = review.into_active_model();
        am.is_approved = Set(true);
        am.updated_at = Set(Some(Utc::now()));
        let review = am.update(&txn).await?;
        refresh_rating(&txn, review.business_id).await?;
        txn.commit().await?;

        Ok(review.into())
    }

    /// Owner's public answer.
    pub async fn reply(
        &self,
        caller: CurrentUser,
        id: i64,
        request: ReplyReviewRequest,
    ) -> AppResult<ReviewResponse> {
        request.validate()?;
        let review = self.find_live(id).await?;
        let business = find_business(&self.pool, review.business_id).await?;
        ensure_manager(caller, &business)?;

        let author = review.user_id;
        let mut am = review.into_active_model();
        am.reply = Set(Some(request.reply.trim().to_string()));
        am.updated_at = Set(Some(Utc::now()));
        let review = am.update(&self.pool).await?;

        self.notifications.spawn_notify(
            vec![author],
            NewNotification {
                title: "Your review was answered".to_string(),
                message: format!("{} replied to your review", business.name),
                notification_type: NotificationType::Review,
                related_id: Some(review.id),
            },
            false,
        );

        Ok(review.into())
    }

    /// Soft delete by the author or an admin.
    pub async fn delete(&self, caller: CurrentUser, id: i64) -> AppResult<()> {
        let review = self.find_live(id).await?;
        if review.user_id != caller.id && !caller.is_admin() {
            return Err(AppError::forbidden());
        }

        let business_id = review.business_id;
        let txn = self.pool.begin().await?;
        let mut am = review.into_active_model();
        am.deleted_at = Set(Some(Utc::now()));
        am.update(&txn).await?;
        refresh_rating(&txn, business_id).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_live(&self, id: i64) -> AppResult<reviews::Model> {
        reviews::Entity::find_by_id(id)
            .filter(reviews::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }
}

/// Recompute `average_rating`/`review_count` from approved, live reviews.
async fn refresh_rating<C: ConnectionTrait>(db: &C, business_id: i64) -> AppResult<()> {
    let ratings = reviews::Entity::find()
        .select_only()
        .column(reviews::Column::Rating)
        .filter(reviews::Column::BusinessId.eq(business_id))
        .filter(reviews::Column::IsApproved.eq(true))
        .filter(reviews::Column::DeletedAt.is_null())
        .into_tuple::<i16>()
        .all(db)
        .await?;

    let business = find_business(db, business_id).await?;
    let mut am: businesses::ActiveModel = business.into_active_model();
    am.average_rating = Set(average_rating(&ratings));
    am.review_count = Set(ratings.len() as i32);
    am.updated_at = Set(Some(Utc::now()));
    am.update(db).await?;
    Ok(())
}

/// Mean rounded to one decimal; 0 without reviews.
fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1, 2, 2]), 1.7);
    }
}
